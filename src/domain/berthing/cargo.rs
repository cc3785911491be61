//! Cargo lines and the customs clearance sub-workflow

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(DomainError::Validation(format!(
                        concat!("Unknown ", $label, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    Container,
    Bulk,
    Liquid,
    BreakBulk,
    RoRo,
    Hazardous,
    Refrigerated,
    General,
}

string_enum!(CargoType, "cargo type", {
    Container => "container",
    Bulk => "bulk",
    Liquid => "liquid",
    BreakBulk => "break_bulk",
    RoRo => "ro_ro",
    Hazardous => "hazardous",
    Refrigerated => "refrigerated",
    General => "general",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoUnit {
    Tons,
    Kg,
    Containers,
    Teu,
    Units,
    CubicMeters,
}

string_enum!(CargoUnit, "cargo unit", {
    Tons => "tons",
    Kg => "kg",
    Containers => "containers",
    Teu => "teu",
    Units => "units",
    CubicMeters => "cubic_meters",
});

/// Customs clearance state of a single cargo line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomsStatus {
    NotVerified,
    InProgress,
    Verified,
    Cleared,
    Held,
}

string_enum!(CustomsStatus, "customs status", {
    NotVerified => "not_verified",
    InProgress => "in_progress",
    Verified => "verified",
    Cleared => "cleared",
    Held => "held",
});

impl CustomsStatus {
    /// Allowed edges of the clearance graph. `cleared` is terminal and a
    /// held line goes back to inspection before it can be verified again.
    pub fn can_transition_to(&self, next: CustomsStatus) -> bool {
        use CustomsStatus::*;
        matches!(
            (self, next),
            (NotVerified, InProgress)
                | (InProgress, Verified)
                | (InProgress, Held)
                | (Verified, Cleared)
                | (Verified, Held)
                | (Held, InProgress)
        )
    }

    /// Still waiting on a broker
    pub fn awaits_clearance(&self) -> bool {
        !matches!(self, Self::Cleared | Self::Held)
    }
}

/// One append-only audit trail line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Cargo line as submitted with a berthing request
#[derive(Debug, Clone)]
pub struct NewCargo {
    pub description: String,
    pub weight: f64,
    pub cargo_type: CargoType,
    pub quantity: f64,
    pub unit: CargoUnit,
    pub cargo_owner_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CargoDetail {
    pub id: String,
    pub description: String,
    pub weight: f64,
    pub cargo_type: CargoType,
    pub quantity: f64,
    pub unit: CargoUnit,
    pub cargo_owner_id: String,
    pub customs_status: CustomsStatus,
    pub notes: Option<String>,
    pub processed_by: Option<String>,
    pub cleared_by: Option<String>,
    pub cleared_at: Option<DateTime<Utc>>,
    pub audit_trail: Vec<AuditEntry>,
}

impl CargoDetail {
    pub fn from_new(new: NewCargo) -> DomainResult<Self> {
        if new.description.trim().is_empty() {
            return Err(DomainError::Validation(
                "cargo description is required".into(),
            ));
        }
        if new.cargo_owner_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "cargo_owner_id is required".into(),
            ));
        }
        if !(new.weight > 0.0) || !(new.quantity > 0.0) {
            return Err(DomainError::Validation(
                "cargo weight and quantity must be positive".into(),
            ));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: new.description.trim().to_string(),
            weight: new.weight,
            cargo_type: new.cargo_type,
            quantity: new.quantity,
            unit: new.unit,
            cargo_owner_id: new.cargo_owner_id,
            customs_status: CustomsStatus::NotVerified,
            notes: new.notes,
            processed_by: None,
            cleared_by: None,
            cleared_at: None,
            audit_trail: Vec::new(),
        })
    }

    /// Move the line along the clearance graph and append its audit entry.
    ///
    /// Authorization is the caller's concern; this only enforces the graph.
    pub fn apply_customs_status(
        &mut self,
        next: CustomsStatus,
        notes: Option<String>,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let from = self.customs_status;
        if !from.can_transition_to(next) {
            return Err(DomainError::StateError(format!(
                "Cannot move cargo {} from {} to {}",
                self.id, from, next
            )));
        }

        self.customs_status = next;
        if notes.is_some() {
            self.notes = notes.clone();
        }
        if self.processed_by.is_none() {
            self.processed_by = Some(actor_id.to_string());
        }
        self.cleared_by = Some(actor_id.to_string());
        self.cleared_at = Some(now);
        self.audit_trail.push(AuditEntry {
            action: format!("status updated to {}", next),
            user: actor_id.to_string(),
            timestamp: now,
            details: json!({
                "notes": notes,
                "from": from.as_str(),
                "to": next.as_str(),
            }),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cargo() -> CargoDetail {
        CargoDetail::from_new(NewCargo {
            description: "Coffee beans".into(),
            weight: 20.0,
            cargo_type: CargoType::Container,
            quantity: 2.0,
            unit: CargoUnit::Teu,
            cargo_owner_id: "owner-1".into(),
            notes: None,
        })
        .unwrap()
    }

    #[test]
    fn clearance_graph_edges() {
        use CustomsStatus::*;
        assert!(NotVerified.can_transition_to(InProgress));
        assert!(!NotVerified.can_transition_to(Cleared));
        assert!(Held.can_transition_to(InProgress));
        assert!(!Held.can_transition_to(Verified));
        for next in [NotVerified, InProgress, Verified, Held, Cleared] {
            assert!(!Cleared.can_transition_to(next));
        }
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn each_update_appends_one_audit_entry() {
        let mut line = cargo();
        let now = Utc::now();
        line.apply_customs_status(CustomsStatus::InProgress, None, "broker-1", now)
            .unwrap();
        line.apply_customs_status(
            CustomsStatus::Verified,
            Some("docs ok".into()),
            "broker-2",
            now,
        )
        .unwrap();

        assert_eq!(line.audit_trail.len(), 2);
        assert_eq!(line.audit_trail[0].action, "status updated to in_progress");
        assert_eq!(line.audit_trail[1].details["from"], "in_progress");
        assert_eq!(line.audit_trail[1].details["notes"], "docs ok");
        assert_eq!(line.processed_by.as_deref(), Some("broker-1"));
        assert_eq!(line.cleared_by.as_deref(), Some("broker-2"));
        assert_eq!(line.notes.as_deref(), Some("docs ok"));
    }

    #[test]
    fn illegal_edge_leaves_line_untouched() {
        let mut line = cargo();
        let err = line
            .apply_customs_status(CustomsStatus::Cleared, None, "broker-1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::StateError(_)));
        assert_eq!(line.customs_status, CustomsStatus::NotVerified);
        assert!(line.audit_trail.is_empty());
        assert!(line.processed_by.is_none());
    }

    #[test]
    fn rejects_missing_owner() {
        let err = CargoDetail::from_new(NewCargo {
            cargo_owner_id: " ".into(),
            description: "x".into(),
            weight: 1.0,
            cargo_type: CargoType::Bulk,
            quantity: 1.0,
            unit: CargoUnit::Tons,
            notes: None,
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_status_is_validation() {
        assert!(matches!(
            "lost".parse::<CustomsStatus>(),
            Err(DomainError::Validation(_))
        ));
        assert_eq!("cubic_meters".parse::<CargoUnit>().unwrap(), CargoUnit::CubicMeters);
    }
}
