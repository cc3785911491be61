//! Harbor berth service
//!
//! Reads configuration from `$BERTH_CONFIG` or
//! `<config_dir>/berth-service/config.toml` and serves until SIGINT/SIGTERM.

use tracing::{error, info};

use harbor_berth::server::{init_tracing, ServerHandle, ServerOptions};
use harbor_berth::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await?;
    handle.install_signal_handler();

    info!("Press Ctrl+C to shut down gracefully.");
    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
