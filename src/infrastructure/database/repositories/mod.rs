//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod berthing_repository;
pub mod dock_repository;
pub mod notification_repository;
pub mod repository_provider;
pub mod ship_repository;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use std::str::FromStr;

use crate::shared::errors::{DomainError, InfraError};

/// Map database failures into the domain taxonomy. Unique index
/// violations are the caller's fault, everything else is ours.
pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    let text = e.to_string();
    if text.contains("UNIQUE") || text.contains("duplicate key") {
        return DomainError::Conflict("Record already exists".into());
    }
    InfraError::from(e).into()
}

pub(crate) fn json_err(e: serde_json::Error) -> DomainError {
    InfraError::from(e).into()
}

/// Parse a text column holding a domain enum
pub(crate) fn parse_column<T>(value: &str, column: &'static str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value.parse().map_err(|_| {
        DomainError::Storage(format!("Unreadable value '{}' in column {}", value, column))
    })
}
