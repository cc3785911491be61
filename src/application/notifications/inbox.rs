//! Personal notification inbox
//!
//! Every operation is scoped to the caller. Administrative roles get no
//! bypass here; the only staff-only operation is [`NotificationService::send_direct`].

use std::sync::Arc;

use tracing::info;

use super::fanout::{Audience, NotificationFanout};
use crate::domain::{
    authorize, Action, Actor, DomainError, DomainResult, NewNotification, Notification,
    NotificationFilter, NotificationType, RepositoryProvider, Resource,
};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct NotificationService {
    repos: Arc<dyn RepositoryProvider>,
    fanout: NotificationFanout,
}

impl NotificationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, fanout: NotificationFanout) -> Self {
        Self { repos, fanout }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        filter: &NotificationFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Notification>> {
        self.repos
            .notifications()
            .find_for_user(&actor.id, filter, page)
            .await
    }

    pub async fn unread_count(&self, actor: &Actor) -> DomainResult<u64> {
        self.repos.notifications().count_unread(&actor.id).await
    }

    async fn owned(&self, id: &str, actor: &Actor, action: Action) -> DomainResult<Notification> {
        let notification = self
            .repos
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", id))?;
        authorize(actor, Resource::Notification(&notification), action)?;
        Ok(notification)
    }

    pub async fn mark_read(&self, id: &str, actor: &Actor) -> DomainResult<Notification> {
        let notification = self.owned(id, actor, Action::Manage).await?;
        if notification.read {
            return Ok(notification);
        }
        self.repos.notifications().mark_read(id).await
    }

    pub async fn mark_all_read(&self, actor: &Actor) -> DomainResult<u64> {
        let count = self.repos.notifications().mark_all_read(&actor.id).await?;
        info!(user_id = %actor.id, count, "Notifications marked read");
        Ok(count)
    }

    pub async fn delete(&self, id: &str, actor: &Actor) -> DomainResult<()> {
        self.owned(id, actor, Action::Delete).await?;
        self.repos.notifications().delete(id).await
    }

    pub async fn clear_read(&self, actor: &Actor) -> DomainResult<u64> {
        let count = self.repos.notifications().delete_read(&actor.id).await?;
        info!(user_id = %actor.id, count, "Read notifications cleared");
        Ok(count)
    }

    /// Staff broadcast of a `system` notification to explicit users
    pub async fn send_direct(
        &self,
        recipients: Vec<String>,
        title: &str,
        message: &str,
        actor: &Actor,
    ) -> DomainResult<Vec<Notification>> {
        authorize(actor, Resource::Broadcast, Action::Create)?;
        if title.trim().is_empty() || message.trim().is_empty() {
            return Err(DomainError::Validation(
                "title and message are required".into(),
            ));
        }
        if recipients.iter().all(|r| r.trim().is_empty()) {
            return Err(DomainError::Validation(
                "at least one recipient is required".into(),
            ));
        }

        let draft = NewNotification::new(NotificationType::System, title.trim(), message.trim());
        let created = self.fanout.dispatch(draft, Audience::Users(recipients)).await;
        info!(sender = %actor.id, count = created.len(), "Direct notification sent");
        Ok(created)
    }
}
