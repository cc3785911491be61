//! Harbor berth service, CLI server
//!
//! Headless berth allocation service for deployment as a systemd unit,
//! container or standalone process.
//!
//! ```sh
//! # Default config (~/.config/berth-service/config.toml)
//! berth-cli
//!
//! # Custom config, port override
//! berth-cli --config /etc/berth-service/config.toml --port 9090
//!
//! # Validate config without starting
//! berth-cli --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use harbor_berth::config::AppConfig;
use harbor_berth::server::{init_tracing, ServerHandle, ServerOptions};

/// Berth allocation and cargo clearance service for port operations.
#[derive(Parser, Debug)]
#[command(
    name = "berth-cli",
    version,
    about = "Berth allocation and cargo clearance service",
    long_about = "REST API server for berth allocation, dock occupancy and \
                  customs clearance of cargo.\n\n\
                  Default config: ~/.config/berth-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "BERTH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(harbor_berth::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.check {
        if let Some(e) = load_error {
            eprintln!("Configuration is invalid: {}", e);
            std::process::exit(1);
        }
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.skip_migrations,
        create_default_admin: true,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
