//! Service runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database
//! and migrations, administrator seeding, the email relay, the REST API
//! and graceful shutdown. The binaries only parse flags and call into it.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{
    create_event_bus, start_email_relay, EmailRelayOptions, Mailer, SharedEventBus,
};
use crate::config::AppConfig;
use crate::domain::{RepositoryProvider, User, UserRole};
use crate::infrastructure::{
    init_database, run_migrations, SeaOrmRepositoryProvider, TracingMailer,
};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::errors::{AppError, InfraError};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup
    pub auto_migrate: bool,
    /// Seed the configured administrator if absent
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running service
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    relay_task: Option<JoinHandle<()>>,
}

/// The global recorder can be installed once per process; later starts
/// reuse the handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

impl ServerHandle {
    /// Start the service:
    /// 1. install the Prometheus recorder
    /// 2. connect to the database and run migrations
    /// 3. seed the administrator
    /// 4. start the email relay
    /// 5. serve the REST API
    pub async fn start(opts: ServerOptions) -> Result<Self, AppError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting berth service...");
        let metrics_handle = prometheus_handle();

        let db = init_database(&app_cfg.database_config())
            .await
            .map_err(InfraError::from)?;
        if opts.auto_migrate {
            run_migrations(&db).await.map_err(InfraError::from)?;
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.create_default_admin {
            seed_admin(repos.as_ref(), &app_cfg).await;
        }

        let event_bus = create_event_bus();
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // Subscribe before serving so nothing published is missed
        let relay_task = if app_cfg.notifications.email_enabled {
            let mailer: Arc<dyn Mailer> =
                Arc::new(TracingMailer::new(app_cfg.notifications.sender.clone()));
            Some(start_email_relay(
                repos.clone(),
                event_bus.subscribe(),
                mailer,
                EmailRelayOptions {
                    base_url: app_cfg.notifications.base_url.clone(),
                    max_in_flight: app_cfg.notifications.max_in_flight_emails,
                },
                shutdown_signal.clone(),
            ))
        } else {
            info!("Email relay disabled");
            None
        };

        let state = ApiState::new(
            repos.clone(),
            event_bus.clone(),
            app_cfg.jwt_config(),
            app_cfg.retry_config(),
            Some(db.clone()),
        );
        let router = create_api_router(state, metrics_handle);

        let addr = app_cfg.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(address = %addr, "REST API listening");
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_shutdown = shutdown_signal.clone();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            });
            if let Err(e) = server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            event_bus,
            repos,
            config: app_cfg,
            db,
            shutdown,
            api_task,
            relay_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGINT / SIGTERM
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for every task to stop once shutdown has been triggered,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            relay_task,
            ..
        } = self;

        let completed = shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "REST API task panicked");
                }
                if let Some(task) = relay_task {
                    if let Err(e) = task.await {
                        error!(error = %e, "Email relay task panicked");
                    }
                }
            })
            .await;
        if !completed {
            warn!("Some tasks did not stop before the shutdown timeout");
        }

        if let Err(e) = db.close().await {
            warn!(error = %e, "Error closing database connection");
        } else {
            info!("Database connection closed");
        }
        info!("Berth service shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Insert the configured administrator unless a user with that id exists
async fn seed_admin(repos: &dyn RepositoryProvider, app_cfg: &AppConfig) {
    let admin = &app_cfg.admin;
    match repos.users().find_by_id(&admin.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let user = User::new(
                admin.id.clone(),
                admin.username.clone(),
                admin.email.clone(),
                UserRole::Admin,
            );
            match repos.users().save(user).await {
                Ok(()) => info!(user_id = %admin.id, "Administrator seeded"),
                Err(e) => error!(error = %e, "Failed to seed administrator"),
            }
        }
        Err(e) => error!(error = %e, "Failed to look up administrator"),
    }
}

/// Initialize tracing from the logging section. Call once, before
/// [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
