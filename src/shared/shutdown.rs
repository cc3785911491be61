//! Graceful shutdown
//!
//! One [`ShutdownSignal`] is shared by the HTTP server and the email relay.
//! It is a latched flag: waiters that arrive after the trigger return
//! immediately, so a `select!` loop can poll it every iteration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Idempotent; only the first call is logged.
    pub fn trigger(&self) {
        let first = self.tx.send_if_modified(|triggered| {
            let changed = !*triggered;
            *triggered = true;
            changed
        });
        if first {
            info!("Shutdown triggered");
        }
    }

    /// Resolves once triggered. Cancel-safe.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this cannot fail while we wait
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger `signal` on SIGTERM or SIGINT (Ctrl+C elsewhere)
pub async fn trigger_on_os_signal(signal: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        let mut term = match unix_signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Cannot install SIGTERM handler");
                return;
            }
        };
        tokio::select! {
            _ = term.recv() => info!("SIGTERM received"),
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => info!("SIGINT received"),
                Err(e) => {
                    error!(error = %e, "Cannot install SIGINT handler");
                    return;
                }
            },
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot install Ctrl+C handler");
            return;
        }
        info!("Ctrl+C received");
    }

    signal.trigger();
}

/// Owns the signal and the grace period for draining tasks
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    grace: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            grace: Duration::from_secs(timeout_secs),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener(&self) {
        tokio::spawn(trigger_on_os_signal(self.signal.clone()));
    }

    /// Wait for the trigger, then give `drain` the grace period.
    /// `false` when the grace period ran out first.
    pub async fn shutdown_with_cleanup<F, Fut>(&self, drain: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.signal.wait().await;
        info!(grace_secs = self.grace.as_secs(), "Draining tasks");

        match tokio::time::timeout(self.grace, drain()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(grace_secs = self.grace.as_secs(), "Drain timed out");
                false
            }
        }
    }
}
