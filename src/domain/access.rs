//! Authorization gate
//!
//! One predicate over `(actor, resource, action)`. Services call
//! [`authorize`] before they mutate anything; nothing else decides who may
//! touch what.

use crate::domain::berthing::{Berthing, CargoDetail};
use crate::domain::notification::Notification;
use crate::domain::user::UserRole;
use crate::shared::errors::DomainError;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_administrative(&self) -> bool {
        self.role.is_administrative()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Ship,
    Dock,
    /// The berthing collection, for creation
    Berthings,
    Berthing(&'a Berthing),
    Cargo {
        berthing: &'a Berthing,
        cargo: &'a CargoDetail,
    },
    ClearanceQueue,
    Notification(&'a Notification),
    /// Direct notifications sent to arbitrary users
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Manage,
    Delete,
    Approve,
    Reject,
    Start,
    Complete,
    Reschedule,
    UpdateCustoms,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    fn from_bool(allowed: bool, reason: &'static str) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }
}

pub fn evaluate(actor: &Actor, resource: Resource<'_>, action: Action) -> Decision {
    use UserRole::*;

    let admin = actor.is_administrative();
    let role = actor.role;

    match (resource, action) {
        (Resource::Ship | Resource::Dock, Action::Read) => Decision::Allow,
        (Resource::Ship, Action::Create) => Decision::from_bool(
            admin || role == MaritimeAgent,
            "Only maritime agents and port staff may register ships",
        ),
        (Resource::Dock, Action::Create | Action::Manage | Action::Delete) => {
            Decision::from_bool(admin, "Only port staff may manage docks")
        }

        (Resource::Berthings, Action::Create) => Decision::from_bool(
            admin || role == MaritimeAgent,
            "Only maritime agents and port staff may request berthings",
        ),
        (Resource::Berthings, Action::Read) => Decision::Allow,

        (Resource::Berthing(b), Action::Read) => Decision::from_bool(
            admin
                || matches!(role, Viewer | CustomsBroker)
                || b.is_owned_by(&actor.id)
                || b.has_cargo_owner(&actor.id),
            "Not allowed to view this berthing",
        ),
        (Resource::Berthing(_), Action::Approve | Action::Reject | Action::Start) => {
            Decision::from_bool(admin, "Only port staff may run berthing transitions")
        }
        (Resource::Berthing(b), Action::Complete | Action::Reschedule | Action::Delete) => {
            Decision::from_bool(
                admin || b.is_owned_by(&actor.id),
                "Only the requester or port staff may change this berthing",
            )
        }

        (Resource::Cargo { cargo, .. }, Action::UpdateCustoms) => Decision::from_bool(
            admin
                || (role == CustomsBroker
                    && cargo
                        .processed_by
                        .as_deref()
                        .map_or(true, |p| p == actor.id)),
            "Cargo is handled by another customs broker",
        ),
        (Resource::Cargo { berthing, cargo }, Action::Read) => Decision::from_bool(
            admin
                || role == CustomsBroker
                || cargo.cargo_owner_id == actor.id
                || berthing.is_owned_by(&actor.id),
            "Not allowed to view this cargo",
        ),

        (Resource::ClearanceQueue, Action::Read) => Decision::from_bool(
            admin || role == CustomsBroker,
            "Only customs brokers and port staff may view the clearance queue",
        ),

        // Inbox is personal; administrative roles get no bypass here.
        (Resource::Notification(n), _) => {
            Decision::from_bool(n.user_id == actor.id, "Notification belongs to another user")
        }
        (Resource::Broadcast, Action::Create) => {
            Decision::from_bool(admin, "Only port staff may send direct notifications")
        }

        _ => Decision::Deny("Action not permitted"),
    }
}

pub fn authorize(actor: &Actor, resource: Resource<'_>, action: Action) -> Result<(), DomainError> {
    match evaluate(actor, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(DomainError::Forbidden(reason.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::berthing::{CargoType, CargoUnit, NewBerthing, NewCargo};
    use crate::domain::notification::{NewNotification, NotificationType};
    use chrono::{Duration, Utc};

    fn berthing() -> Berthing {
        let now = Utc::now();
        Berthing::request(
            NewBerthing {
                ship_id: "s".into(),
                dock_id: "d".into(),
                arrival_date: now,
                departure_date: now + Duration::days(1),
                cargo: vec![NewCargo {
                    description: "Grain".into(),
                    weight: 100.0,
                    cargo_type: CargoType::Bulk,
                    quantity: 100.0,
                    unit: CargoUnit::Tons,
                    cargo_owner_id: "owner".into(),
                    notes: None,
                }],
                documents: vec![],
                notes: None,
            },
            "agent",
        )
        .unwrap()
    }

    #[test]
    fn administrative_roles_run_transitions() {
        let b = berthing();
        for role in UserRole::ADMINISTRATIVE {
            let actor = Actor::new("staff", role);
            assert!(authorize(&actor, Resource::Berthing(&b), Action::Approve).is_ok());
            assert!(authorize(&actor, Resource::Berthing(&b), Action::Delete).is_ok());
        }
        let agent = Actor::new("agent", UserRole::MaritimeAgent);
        assert!(matches!(
            authorize(&agent, Resource::Berthing(&b), Action::Approve),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn ownership_gates_completion() {
        let b = berthing();
        let owner = Actor::new("agent", UserRole::MaritimeAgent);
        let other = Actor::new("agent-2", UserRole::MaritimeAgent);
        assert_eq!(evaluate(&owner, Resource::Berthing(&b), Action::Complete), Decision::Allow);
        assert!(matches!(
            evaluate(&other, Resource::Berthing(&b), Action::Complete),
            Decision::Deny(_)
        ));
        assert!(matches!(
            evaluate(&other, Resource::Berthing(&b), Action::Read),
            Decision::Deny(_)
        ));
    }

    #[test]
    fn cargo_owner_reads_but_cannot_clear() {
        let b = berthing();
        let cargo = &b.cargo_details[0];
        let owner = Actor::new("owner", UserRole::CargoOwner);
        let res = Resource::Cargo { berthing: &b, cargo };
        assert_eq!(evaluate(&owner, res, Action::Read), Decision::Allow);
        assert_eq!(evaluate(&owner, Resource::Berthing(&b), Action::Read), Decision::Allow);
        assert!(matches!(evaluate(&owner, res, Action::UpdateCustoms), Decision::Deny(_)));
    }

    #[test]
    fn broker_must_match_processed_by() {
        let mut b = berthing();
        b.cargo_details[0].processed_by = Some("broker-1".into());
        let cargo = &b.cargo_details[0];
        let res = Resource::Cargo { berthing: &b, cargo };

        let first = Actor::new("broker-1", UserRole::CustomsBroker);
        let second = Actor::new("broker-2", UserRole::CustomsBroker);
        let admin = Actor::new("root", UserRole::Admin);
        assert_eq!(evaluate(&first, res, Action::UpdateCustoms), Decision::Allow);
        assert!(matches!(evaluate(&second, res, Action::UpdateCustoms), Decision::Deny(_)));
        assert_eq!(evaluate(&admin, res, Action::UpdateCustoms), Decision::Allow);
    }

    #[test]
    fn inbox_is_never_bypassed() {
        let n = Notification::addressed(
            &NewNotification::new(NotificationType::System, "t", "m"),
            "user-1",
        );
        let admin = Actor::new("root", UserRole::Admin);
        let me = Actor::new("user-1", UserRole::Viewer);
        assert!(authorize(&admin, Resource::Notification(&n), Action::Read).is_err());
        assert!(authorize(&me, Resource::Notification(&n), Action::Delete).is_ok());
    }

    #[test]
    fn only_staff_manage_docks() {
        let agent = Actor::new("a", UserRole::MaritimeAgent);
        let authority = Actor::new("p", UserRole::PortAuthority);
        assert!(authorize(&agent, Resource::Dock, Action::Create).is_err());
        assert!(authorize(&authority, Resource::Dock, Action::Manage).is_ok());
        assert!(authorize(&agent, Resource::Ship, Action::Create).is_ok());
        assert!(authorize(&agent, Resource::ClearanceQueue, Action::Read).is_err());
    }
}
