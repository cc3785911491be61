use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BerthingRequest,
    BerthingApproved,
    BerthingRejected,
    BerthingInProgress,
    BerthingCompleted,
    BerthingCancelled,
    CustomsUpdate,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BerthingRequest => "berthing_request",
            Self::BerthingApproved => "berthing_approved",
            Self::BerthingRejected => "berthing_rejected",
            Self::BerthingInProgress => "berthing_in_progress",
            Self::BerthingCompleted => "berthing_completed",
            Self::BerthingCancelled => "berthing_cancelled",
            Self::CustomsUpdate => "customs_update",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "berthing_request" => Ok(Self::BerthingRequest),
            "berthing_approved" => Ok(Self::BerthingApproved),
            "berthing_rejected" => Ok(Self::BerthingRejected),
            "berthing_in_progress" => Ok(Self::BerthingInProgress),
            "berthing_completed" => Ok(Self::BerthingCompleted),
            "berthing_cancelled" => Ok(Self::BerthingCancelled),
            "customs_update" => Ok(Self::CustomsUpdate),
            "system" => Ok(Self::System),
            other => Err(DomainError::Validation(format!(
                "Unknown notification type '{}'",
                other
            ))),
        }
    }
}

/// Weak back-reference to the document a notification is about.
/// Deleting the document never touches its notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RelatedDocument {
    Berthing(String),
    Cargo(String),
}

impl RelatedDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Berthing(_) => "berthing",
            Self::Cargo(_) => "cargo",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Berthing(id) | Self::Cargo(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: String) -> Option<Self> {
        match kind {
            "berthing" => Some(Self::Berthing(id)),
            "cargo" => Some(Self::Cargo(id)),
            _ => None,
        }
    }
}

/// Notification content before it is addressed to anyone
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related: Option<RelatedDocument>,
    pub action_url: Option<String>,
}

impl NewNotification {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type,
            related: None,
            action_url: None,
        }
    }

    pub fn related(mut self, related: RelatedDocument) -> Self {
        self.related = Some(related);
        self
    }

    pub fn action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub related: Option<RelatedDocument>,
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn addressed(draft: &NewNotification, user_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: draft.title.clone(),
            message: draft.message.clone(),
            notification_type: draft.notification_type,
            read: false,
            read_at: None,
            related: draft.related.clone(),
            action_url: draft.action_url.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_document_is_tagged() {
        let json = serde_json::to_value(RelatedDocument::Cargo("c-1".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "cargo", "id": "c-1"}));
        assert_eq!(
            RelatedDocument::from_parts("berthing", "b-1".into()),
            Some(RelatedDocument::Berthing("b-1".into()))
        );
        assert_eq!(RelatedDocument::from_parts("ship", "s".into()), None);
    }

    #[test]
    fn addressed_copy_starts_unread() {
        let draft = NewNotification::new(NotificationType::System, "Hi", "Body")
            .related(RelatedDocument::Berthing("b-1".into()));
        let n = Notification::addressed(&draft, "u-1");
        assert!(!n.read);
        assert_eq!(n.user_id, "u-1");
        assert_eq!(n.related.as_ref().map(|r| r.id()), Some("b-1"));
    }
}
