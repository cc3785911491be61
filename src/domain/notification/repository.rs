use async_trait::async_trait;

use super::model::{Notification, NotificationType};
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub read: Option<bool>,
    pub notification_type: Option<NotificationType>,
}

impl NotificationFilter {
    pub fn matches(&self, n: &Notification) -> bool {
        self.read.map_or(true, |r| n.read == r)
            && self
                .notification_type
                .map_or(true, |t| n.notification_type == t)
    }
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Notification>>;

    /// Newest first
    async fn find_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Notification>>;

    async fn count_unread(&self, user_id: &str) -> DomainResult<u64>;

    /// Mark one notification read; already-read ones keep their `read_at`
    async fn mark_read(&self, id: &str) -> DomainResult<Notification>;

    /// Returns how many were flipped
    async fn mark_all_read(&self, user_id: &str) -> DomainResult<u64>;

    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Returns how many were removed
    async fn delete_read(&self, user_id: &str) -> DomainResult<u64>;
}
