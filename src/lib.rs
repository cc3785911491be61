//! # Harbor berth service
//!
//! Berth allocation and cargo clearance for port operations: ships request
//! docks for a time window, port staff approve or reject, the vessel is
//! worked alongside, and customs brokers clear each cargo line.
//!
//! ## Architecture
//!
//! - **domain**: entities, state machines, the authorization predicate and
//!   repository traits
//! - **application**: workflow services (allocation, clearance, registry,
//!   notifications) and the event bus
//! - **infrastructure**: SeaORM and in-memory stores, JWT verification, mailer
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider,
};

pub use interfaces::http::{create_api_router, ApiState};

pub use application::{create_event_bus, EventBus, SharedEventBus};
