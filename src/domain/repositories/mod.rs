//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::berthing::BerthingRepository;
use super::dock::DockRepository;
use super::notification::NotificationRepository;
use super::ship::ShipRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let dock = repos.docks().find_by_id("dock-1").await?;
///     let berthing = repos.berthings().find_by_cargo_id("cargo-7").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn ships(&self) -> &dyn ShipRepository;
    fn docks(&self) -> &dyn DockRepository;
    fn berthings(&self) -> &dyn BerthingRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
}
