//! Application layer
//!
//! Use-case services over the domain repositories: the berth allocation
//! engine, cargo clearance, ship/dock registry and the notification inbox,
//! plus the event bus and outbound ports they talk through.

pub mod allocation;
pub mod clearance;
pub mod events;
pub mod notifications;
pub mod ports;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use allocation::{BerthAllocationService, BerthingUpdate};
pub use clearance::{ClearanceItem, ClearanceService};
pub use events::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use notifications::{
    start_email_relay, Audience, EmailRelayOptions, NotificationFanout, NotificationService,
};
pub use ports::{MailError, Mailer, OutboundEmail};
pub use registry::{DockService, ShipService};
