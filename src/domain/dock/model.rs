//! Dock domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Dock occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockStatus {
    Available,
    Occupied,
    Maintenance,
}

impl DockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for DockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "occupied" => Ok(Self::Occupied),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(DomainError::Validation(format!(
                "Unknown dock status '{}'",
                other
            ))),
        }
    }
}

/// The only way a berthing transition may touch its dock.
///
/// Every store applies a claim in exactly one place, inside the same
/// transaction as the berthing write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockClaim {
    /// Compare-and-swap `available -> occupied`; fails with `Conflict`
    Reserve,
    /// Restate `occupied` unconditionally
    Hold,
    /// Set `available`
    Release,
    /// Leave the dock untouched
    Keep,
}

impl DockClaim {
    /// Status the dock ends up in, if the claim writes one
    pub fn target_status(&self) -> Option<DockStatus> {
        match self {
            Self::Reserve | Self::Hold => Some(DockStatus::Occupied),
            Self::Release => Some(DockStatus::Available),
            Self::Keep => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDock {
    pub name: String,
    pub length: f64,
    pub max_draft: f64,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dock {
    pub id: String,
    pub name: String,
    pub length: f64,
    pub max_draft: f64,
    pub location: Option<String>,
    pub status: DockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dock {
    pub fn register(new: NewDock) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        if !(new.length > 0.0) || !(new.max_draft > 0.0) {
            return Err(DomainError::Validation(
                "length and max_draft must be positive".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            length: new.length,
            max_draft: new.max_draft,
            location: new.location.filter(|l| !l.trim().is_empty()),
            status: DockStatus::Available,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == DockStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_dock_starts_available() {
        let dock = Dock::register(NewDock {
            name: "D1".into(),
            length: 300.0,
            max_draft: 14.5,
            location: Some("  ".into()),
        })
        .unwrap();
        assert!(dock.is_available());
        assert_eq!(dock.location, None);
    }

    #[test]
    fn claims_map_to_dock_status() {
        assert_eq!(DockClaim::Reserve.target_status(), Some(DockStatus::Occupied));
        assert_eq!(DockClaim::Hold.target_status(), Some(DockStatus::Occupied));
        assert_eq!(DockClaim::Release.target_status(), Some(DockStatus::Available));
        assert_eq!(DockClaim::Keep.target_status(), None);
    }

    #[test]
    fn rejects_zero_draft() {
        let err = Dock::register(NewDock {
            name: "D2".into(),
            length: 100.0,
            max_draft: 0.0,
            location: None,
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
