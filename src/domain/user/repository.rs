use async_trait::async_trait;

use super::{User, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or replace a directory entry
    async fn save(&self, user: User) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    /// Active users holding any of `roles` (fan-out targeting)
    async fn find_active_by_roles(&self, roles: &[UserRole]) -> DomainResult<Vec<User>>;
}
