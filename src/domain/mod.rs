//! Domain layer
//!
//! Aggregates (ship, dock, berthing with embedded cargo, notification, user),
//! their repository traits, the access policy and the workflow events.

pub mod access;
pub mod berthing;
pub mod dock;
pub mod events;
pub mod notification;
pub mod repositories;
pub mod ship;
pub mod user;

pub use access::{authorize, evaluate, Action, Actor, Decision, Resource};
pub use berthing::{
    AuditEntry, Berthing, BerthingFilter, BerthingRepository, BerthingStatus, CargoDetail,
    CargoType, CargoUnit, CustomsStatus, DocumentRef, NewBerthing, NewCargo, SchedulePatch,
};
pub use dock::{Dock, DockClaim, DockRepository, DockStatus, NewDock};
pub use notification::{
    NewNotification, Notification, NotificationFilter, NotificationRepository,
    NotificationType, RelatedDocument,
};
pub use repositories::{DomainResult, RepositoryProvider};
pub use ship::{NewShip, Ship, ShipRepository, ShipType};
pub use user::{User, UserRepository, UserRole};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
