//! Berthing aggregate root and its state machine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cargo::{CargoDetail, NewCargo};
use crate::domain::dock::DockClaim;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BerthingStatus {
    Pending,
    Approved,
    InProgress,
    Rejected,
    Completed,
}

impl BerthingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// States in which the berthing holds its dock
    pub fn holds_dock(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved | Self::InProgress)
    }
}

impl fmt::Display for BerthingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BerthingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "in_progress" => Ok(Self::InProgress),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!(
                "Unknown berthing status '{}'",
                other
            ))),
        }
    }
}

/// Opaque file metadata; the bytes live with the storage provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBerthing {
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub cargo: Vec<NewCargo>,
    pub documents: Vec<DocumentRef>,
    pub notes: Option<String>,
}

/// Window and notes changes allowed while pending
#[derive(Debug, Clone, Default)]
pub struct SchedulePatch {
    pub arrival_date: Option<DateTime<Utc>>,
    pub departure_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        self.arrival_date.is_none() && self.departure_date.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Berthing {
    pub id: String,
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub status: BerthingStatus,
    pub cargo_details: Vec<CargoDetail>,
    pub documents: Vec<DocumentRef>,
    pub notes: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency counter, bumped by every store write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_window(arrival: DateTime<Utc>, departure: DateTime<Utc>) -> DomainResult<()> {
    if departure <= arrival {
        return Err(DomainError::Validation(
            "departure_date must be after arrival_date".into(),
        ));
    }
    Ok(())
}

impl Berthing {
    /// Build a pending berthing. The dock reservation happens in the store.
    pub fn request(new: NewBerthing, created_by: &str) -> DomainResult<Self> {
        check_window(new.arrival_date, new.departure_date)?;
        let cargo_details = new
            .cargo
            .into_iter()
            .map(CargoDetail::from_new)
            .collect::<DomainResult<Vec<_>>>()?;

        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            ship_id: new.ship_id,
            dock_id: new.dock_id,
            arrival_date: new.arrival_date,
            departure_date: new.departure_date,
            status: BerthingStatus::Pending,
            cargo_details,
            documents: new.documents,
            notes: new.notes,
            created_by: created_by.to_string(),
            approved_by: None,
            rejected_by: None,
            rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }

    pub fn has_cargo_owner(&self, user_id: &str) -> bool {
        self.cargo_details.iter().any(|c| c.cargo_owner_id == user_id)
    }

    pub fn cargo(&self, cargo_id: &str) -> Option<&CargoDetail> {
        self.cargo_details.iter().find(|c| c.id == cargo_id)
    }

    pub fn cargo_mut(&mut self, cargo_id: &str) -> Option<&mut CargoDetail> {
        self.cargo_details.iter_mut().find(|c| c.id == cargo_id)
    }

    fn require(&self, allowed: &[BerthingStatus], action: &str) -> DomainResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::StateError(format!(
                "Cannot {} berthing {} in status {}",
                action, self.id, self.status
            )))
        }
    }

    pub fn approve(&mut self, approver: &str) -> DomainResult<DockClaim> {
        self.require(&[BerthingStatus::Pending], "approve")?;
        self.status = BerthingStatus::Approved;
        self.approved_by = Some(approver.to_string());
        self.updated_at = Utc::now();
        Ok(DockClaim::Hold)
    }

    pub fn reject(&mut self, rejector: &str, reason: &str) -> DomainResult<DockClaim> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::Validation("rejection reason is required".into()));
        }
        self.require(&[BerthingStatus::Pending], "reject")?;
        self.status = BerthingStatus::Rejected;
        self.rejected_by = Some(rejector.to_string());
        self.rejection_reason = Some(reason.to_string());
        self.updated_at = Utc::now();
        Ok(DockClaim::Release)
    }

    pub fn start(&mut self) -> DomainResult<DockClaim> {
        self.require(&[BerthingStatus::Approved], "start")?;
        self.status = BerthingStatus::InProgress;
        self.updated_at = Utc::now();
        Ok(DockClaim::Hold)
    }

    pub fn complete(&mut self) -> DomainResult<DockClaim> {
        self.require(
            &[BerthingStatus::Approved, BerthingStatus::InProgress],
            "complete",
        )?;
        self.status = BerthingStatus::Completed;
        self.updated_at = Utc::now();
        Ok(DockClaim::Release)
    }

    pub fn reschedule(&mut self, patch: SchedulePatch) -> DomainResult<DockClaim> {
        self.require(&[BerthingStatus::Pending], "reschedule")?;
        let arrival = patch.arrival_date.unwrap_or(self.arrival_date);
        let departure = patch.departure_date.unwrap_or(self.departure_date);
        check_window(arrival, departure)?;

        self.arrival_date = arrival;
        self.departure_date = departure;
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
        self.updated_at = Utc::now();
        Ok(DockClaim::Keep)
    }

    /// Claim to apply when the berthing is removed
    pub fn deletion_claim(&self) -> DomainResult<DockClaim> {
        match self.status {
            BerthingStatus::Pending | BerthingStatus::Approved => Ok(DockClaim::Release),
            BerthingStatus::Rejected => Ok(DockClaim::Keep),
            BerthingStatus::InProgress | BerthingStatus::Completed => {
                Err(DomainError::StateError(format!(
                    "Cannot delete berthing {} in status {}",
                    self.id, self.status
                )))
            }
        }
    }
}
