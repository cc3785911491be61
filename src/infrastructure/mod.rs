//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod mail;
pub mod storage;

pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use mail::TracingMailer;
pub use storage::InMemoryRepositoryProvider;
