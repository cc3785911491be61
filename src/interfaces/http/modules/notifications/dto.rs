//! Notification DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Notification, NotificationFilter, NotificationType};
use crate::shared::errors::DomainError;
use crate::shared::PaginationParams;

/// Notification API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// `berthing` or `cargo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        let (related_kind, related_id) = match &n.related {
            Some(r) => (Some(r.kind().to_string()), Some(r.id().to_string())),
            None => (None, None),
        };
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type.to_string(),
            read: n.read,
            read_at: n.read_at,
            related_kind,
            related_id,
            action_url: n.action_url,
            created_at: n.created_at,
        }
    }
}

/// Inbox query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListNotificationsParams {
    /// Only read (`true`) or unread (`false`) notifications
    pub read: Option<bool>,
    /// Filter by notification type
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl ListNotificationsParams {
    pub fn into_parts(self) -> Result<(NotificationFilter, PaginationParams), DomainError> {
        let filter = NotificationFilter {
            read: self.read,
            notification_type: self
                .notification_type
                .as_deref()
                .map(str::parse::<NotificationType>)
                .transpose()?,
        };
        Ok((filter, PaginationParams::new(self.page, self.limit)))
    }
}

/// Direct `system` notification to explicit users
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendNotificationRequest {
    #[validate(length(min = 1))]
    pub recipients: Vec<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountDto {
    pub count: u64,
}

/// Result of a bulk inbox operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AffectedDto {
    pub affected: u64,
}
