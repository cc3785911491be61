//! Ship repository interface

use async_trait::async_trait;

use super::model::Ship;
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait ShipRepository: Send + Sync {
    /// Save a new ship; a duplicate IMO number is a `Conflict`
    async fn save(&self, ship: Ship) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ship>>;

    async fn find_by_imo(&self, imo_number: &str) -> DomainResult<Option<Ship>>;

    /// Newest first
    async fn find_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Ship>>;
}
