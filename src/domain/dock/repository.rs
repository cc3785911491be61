//! Dock repository interface

use async_trait::async_trait;

use super::model::{Dock, DockStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait DockRepository: Send + Sync {
    /// Save a new dock; a duplicate name is a `Conflict`
    async fn save(&self, dock: Dock) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Dock>>;

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Dock>>;

    async fn find_all(&self, status: Option<DockStatus>) -> DomainResult<Vec<Dock>>;

    /// Toggle maintenance.
    ///
    /// Enabling is a compare-and-swap from `available`; disabling from
    /// `maintenance`. An occupied dock is a `Conflict`.
    async fn set_maintenance(&self, id: &str, enabled: bool) -> DomainResult<Dock>;

    /// Remove a dock. `Conflict` while occupied or referenced by any berthing.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
