//! Workflow events
//!
//! Facts published on the in-process bus after they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::berthing::{BerthingStatus, CustomsStatus};
use crate::domain::notification::Notification;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    BerthingStatusChanged(BerthingStatusChangedEvent),
    BerthingDeleted(BerthingDeletedEvent),
    CustomsStatusChanged(CustomsStatusChangedEvent),
    NotificationCreated(Notification),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BerthingStatusChanged(_) => "berthing_status_changed",
            Event::BerthingDeleted(_) => "berthing_deleted",
            Event::CustomsStatusChanged(_) => "customs_status_changed",
            Event::NotificationCreated(_) => "notification_created",
        }
    }

    /// Id of the document the event is about
    pub fn subject_id(&self) -> &str {
        match self {
            Event::BerthingStatusChanged(e) => &e.berthing_id,
            Event::BerthingDeleted(e) => &e.berthing_id,
            Event::CustomsStatusChanged(e) => &e.cargo_id,
            Event::NotificationCreated(n) => &n.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BerthingStatusChangedEvent {
    pub berthing_id: String,
    pub dock_id: String,
    /// `None` on creation
    pub from: Option<BerthingStatus>,
    pub to: BerthingStatus,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BerthingDeletedEvent {
    pub berthing_id: String,
    pub dock_id: String,
    pub released_dock: bool,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomsStatusChangedEvent {
    pub cargo_id: String,
    pub berthing_id: String,
    pub from: CustomsStatus,
    pub to: CustomsStatus,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Event envelope carried by the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
