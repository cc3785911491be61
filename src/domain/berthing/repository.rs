//! Berthing repository interface
//!
//! Every write that changes a berthing also applies its `DockClaim` in the
//! same transaction, so readers never observe the two out of step.

use async_trait::async_trait;

use super::cargo::CargoDetail;
use super::model::{Berthing, BerthingStatus};
use crate::domain::dock::DockClaim;
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[derive(Debug, Clone, Default)]
pub struct BerthingFilter {
    pub status: Option<BerthingStatus>,
    pub dock_id: Option<String>,
    pub ship_id: Option<String>,
    pub created_by: Option<String>,
    pub cargo_owner_id: Option<String>,
}

impl BerthingFilter {
    pub fn matches(&self, b: &Berthing) -> bool {
        self.status.map_or(true, |s| b.status == s)
            && self.dock_id.as_deref().map_or(true, |d| b.dock_id == d)
            && self.ship_id.as_deref().map_or(true, |s| b.ship_id == s)
            && self.created_by.as_deref().map_or(true, |u| b.created_by == u)
            && self
                .cargo_owner_id
                .as_deref()
                .map_or(true, |o| b.has_cargo_owner(o))
    }
}

#[async_trait]
pub trait BerthingRepository: Send + Sync {
    /// Insert a new berthing with its cargo and reserve its dock.
    ///
    /// `Conflict` when the dock is not `available`; nothing is written then.
    async fn insert_reserving_dock(&self, berthing: &Berthing) -> DomainResult<()>;

    /// Persist a transition of `berthing` together with `claim`.
    ///
    /// `berthing.version` is the version that was read; a concurrent write
    /// makes this return `StaleWrite`. Returns the new version.
    async fn save_transition(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<i64>;

    /// Persist one cargo line of `berthing`, guarded by the berthing version
    async fn save_cargo(&self, berthing: &Berthing, cargo: &CargoDetail) -> DomainResult<i64>;

    /// Remove the berthing and its cargo, applying `claim` to the dock
    async fn delete(&self, berthing: &Berthing, claim: DockClaim) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Berthing>>;

    /// Parent berthing of a cargo line
    async fn find_by_cargo_id(&self, cargo_id: &str) -> DomainResult<Option<Berthing>>;

    /// Newest first
    async fn find_all(
        &self,
        filter: &BerthingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Berthing>>;

    async fn find_in_statuses(&self, statuses: &[BerthingStatus]) -> DomainResult<Vec<Berthing>>;
}
