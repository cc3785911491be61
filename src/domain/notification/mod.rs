//! Addressed, poll-based inbox messages

pub mod model;
pub mod repository;

pub use model::{NewNotification, Notification, NotificationType, RelatedDocument};
pub use repository::{NotificationFilter, NotificationRepository};
