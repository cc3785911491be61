//! Best-effort notification fan-out
//!
//! Workflow transitions hand a draft and an audience to
//! [`NotificationFanout::dispatch`] after their own write committed. Every
//! failure in here is logged and swallowed: a transition never fails because
//! someone could not be notified.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::events::{Event, SharedEventBus};
use crate::domain::{NewNotification, Notification, RepositoryProvider, UserRole};

/// Who receives a notification
#[derive(Debug, Clone)]
pub enum Audience {
    Users(Vec<String>),
    /// Every active admin and port authority user
    AdministrativeRoles,
}

impl Audience {
    pub fn user(id: impl Into<String>) -> Self {
        Self::Users(vec![id.into()])
    }
}

#[derive(Clone)]
pub struct NotificationFanout {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
}

impl NotificationFanout {
    pub fn new(repos: Arc<dyn RepositoryProvider>, event_bus: SharedEventBus) -> Self {
        Self { repos, event_bus }
    }

    /// Persist one notification per distinct recipient and publish each.
    /// Returns the ones that were stored.
    pub async fn dispatch(&self, draft: NewNotification, audience: Audience) -> Vec<Notification> {
        let recipients = match self.resolve(audience).await {
            Some(r) => r,
            None => return Vec::new(),
        };

        let mut created = Vec::with_capacity(recipients.len());
        for user_id in recipients {
            let notification = Notification::addressed(&draft, &user_id);
            match self.repos.notifications().insert(&notification).await {
                Ok(()) => {
                    debug!(
                        notification_id = %notification.id,
                        user_id = %user_id,
                        notification_type = %draft.notification_type,
                        "Notification created"
                    );
                    self.event_bus
                        .publish(Event::NotificationCreated(notification.clone()));
                    created.push(notification);
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        notification_type = %draft.notification_type,
                        error = %e,
                        "Failed to store notification"
                    );
                }
            }
        }
        created
    }

    async fn resolve(&self, audience: Audience) -> Option<BTreeSet<String>> {
        match audience {
            Audience::Users(ids) => Some(
                ids.into_iter()
                    .filter(|id| !id.trim().is_empty())
                    .collect(),
            ),
            Audience::AdministrativeRoles => {
                match self
                    .repos
                    .users()
                    .find_active_by_roles(&UserRole::ADMINISTRATIVE)
                    .await
                {
                    Ok(users) => Some(users.into_iter().map(|u| u.id).collect()),
                    Err(e) => {
                        warn!(error = %e, "Failed to resolve administrative recipients");
                        None
                    }
                }
            }
        }
    }
}
