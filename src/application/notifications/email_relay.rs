//! Background task relaying new notifications to email.
//!
//! Subscribes to the event bus and hands every `NotificationCreated` to the
//! [`Mailer`] port. Deliveries run on a `JoinSet` capped at `max_in_flight`;
//! when the cap is reached the relay stops reading the bus until a slot
//! frees up. On shutdown the relay stops reading and drains what is in
//! flight. Failures are logged and dropped.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::application::events::{Event, EventSubscriber};
use crate::application::ports::{Mailer, OutboundEmail};
use crate::domain::{Notification, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

pub struct EmailRelayOptions {
    pub base_url: Option<String>,
    pub max_in_flight: usize,
}

/// Start the relay. `subscriber` should be taken before any workflow runs so
/// nothing published at startup is missed.
pub fn start_email_relay(
    repos: Arc<dyn RepositoryProvider>,
    mut subscriber: EventSubscriber,
    mailer: Arc<dyn Mailer>,
    options: EmailRelayOptions,
    shutdown: ShutdownSignal,
) -> JoinHandle<()> {
    let slots = Arc::new(Semaphore::new(options.max_in_flight.max(1)));

    tokio::spawn(async move {
        info!(max_in_flight = options.max_in_flight, "Email relay started");
        let mut deliveries = JoinSet::new();

        loop {
            tokio::select! {
                message = subscriber.recv() => {
                    let Some(message) = message else { break };
                    let Event::NotificationCreated(notification) = message.event else {
                        continue;
                    };
                    let Some(email) = compose(&repos, options.base_url.as_deref(), &notification).await else {
                        continue;
                    };
                    let Ok(slot) = slots.clone().acquire_owned().await else { break };
                    let mailer = mailer.clone();
                    let notification_id = notification.id;
                    deliveries.spawn(async move {
                        let _slot = slot;
                        if let Err(e) = mailer.send(email).await {
                            warn!(%notification_id, error = %e, "Email delivery failed");
                        }
                    });
                }
                Some(done) = deliveries.join_next(), if !deliveries.is_empty() => {
                    if let Err(e) = done {
                        warn!(error = %e, "Email delivery task aborted");
                    }
                }
                _ = shutdown.wait() => {
                    info!(in_flight = deliveries.len(), "Email relay shutting down");
                    break;
                }
            }
        }

        while let Some(done) = deliveries.join_next().await {
            if let Err(e) = done {
                warn!(error = %e, "Email delivery task aborted");
            }
        }
        info!("Email relay stopped");
    })
}

/// `None` when the recipient has no deliverable address
async fn compose(
    repos: &Arc<dyn RepositoryProvider>,
    base_url: Option<&str>,
    notification: &Notification,
) -> Option<OutboundEmail> {
    let user = match repos.users().find_by_id(&notification.user_id).await {
        Ok(Some(user)) if user.is_active && !user.email.is_empty() => user,
        Ok(_) => {
            debug!(user_id = %notification.user_id, "No deliverable address, skipping email");
            return None;
        }
        Err(e) => {
            warn!(user_id = %notification.user_id, error = %e, "Email recipient lookup failed");
            return None;
        }
    };

    Some(OutboundEmail {
        recipient: user.email,
        subject: notification.title.clone(),
        body: render_body(notification, base_url),
    })
}

fn render_body(notification: &Notification, base_url: Option<&str>) -> String {
    match (base_url, notification.action_url.as_deref()) {
        (Some(base), Some(path)) => format!(
            "{}\n\n{}{}",
            notification.message,
            base.trim_end_matches('/'),
            path
        ),
        _ => notification.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::EventBus;
    use crate::application::ports::MailError;
    use crate::domain::{NewNotification, NotificationType, User, UserRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelMailer(mpsc::UnboundedSender<OutboundEmail>);

    #[async_trait]
    impl Mailer for ChannelMailer {
        async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
            self.0
                .send(email)
                .map_err(|e| MailError::Delivery(e.to_string()))
        }
    }

    #[tokio::test]
    async fn relays_notifications_to_user_email() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .users()
            .save(User::new("u1", "ana", "ana@shipping.test", UserRole::MaritimeAgent))
            .await
            .unwrap();

        let bus = EventBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = ShutdownSignal::new();
        let handle = start_email_relay(
            repos,
            bus.subscribe(),
            Arc::new(ChannelMailer(tx)),
            EmailRelayOptions {
                base_url: Some("https://port.test/".into()),
                max_in_flight: 4,
            },
            shutdown.clone(),
        );

        let draft = NewNotification::new(NotificationType::BerthingApproved, "Approved", "B1 approved")
            .action_url("/berthings/b1");
        bus.publish(Event::NotificationCreated(Notification::addressed(&draft, "u1")));
        bus.publish(Event::NotificationCreated(Notification::addressed(&draft, "unknown")));

        let email = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(email.recipient, "ana@shipping.test");
        assert_eq!(email.subject, "Approved");
        assert!(email.body.ends_with("https://port.test/berthings/b1"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    /// Parks every send until the test hands out a permit on `gate`
    struct GatedMailer {
        gate: Semaphore,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delivered: AtomicUsize,
    }

    #[async_trait]
    impl Mailer for GatedMailer {
        async fn send(&self, _email: OutboundEmail) -> Result<(), MailError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.gate
                .acquire()
                .await
                .map_err(|e| MailError::Delivery(e.to_string()))?
                .forget();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn eventually(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn deliveries_are_capped_and_drained_on_shutdown() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .users()
            .save(User::new("u1", "ana", "ana@shipping.test", UserRole::MaritimeAgent))
            .await
            .unwrap();

        let mailer = Arc::new(GatedMailer {
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
        });
        let bus = EventBus::new();
        let shutdown = ShutdownSignal::new();
        let handle = start_email_relay(
            repos,
            bus.subscribe(),
            mailer.clone(),
            EmailRelayOptions {
                base_url: None,
                max_in_flight: 2,
            },
            shutdown.clone(),
        );

        let draft = NewNotification::new(NotificationType::BerthingRequest, "New request", "B1");
        for _ in 0..4 {
            bus.publish(Event::NotificationCreated(Notification::addressed(&draft, "u1")));
        }

        eventually(|| mailer.in_flight.load(Ordering::SeqCst) == 2).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mailer.peak.load(Ordering::SeqCst), 2);

        mailer.gate.add_permits(2);
        eventually(|| {
            mailer.delivered.load(Ordering::SeqCst) == 2
                && mailer.in_flight.load(Ordering::SeqCst) == 2
        })
        .await;

        shutdown.trigger();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        mailer.gate.add_permits(2);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mailer.delivered.load(Ordering::SeqCst), 4);
        assert_eq!(mailer.peak.load(Ordering::SeqCst), 2);
    }
}
