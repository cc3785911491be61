//! Customs DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::ClearanceItem;
use crate::domain::AuditEntry;
use crate::interfaces::http::modules::berthings::CargoDto;

/// Customs status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomsStatusRequest {
    /// in_progress, verified, cleared or held
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Cargo line awaiting clearance with its berthing context
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearanceItemDto {
    pub cargo: CargoDto,
    pub berthing_id: String,
    pub berthing_status: String,
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
}

impl From<ClearanceItem> for ClearanceItemDto {
    fn from(i: ClearanceItem) -> Self {
        Self {
            cargo: i.cargo.into(),
            berthing_id: i.berthing_id,
            berthing_status: i.berthing_status.to_string(),
            ship_id: i.ship_id,
            dock_id: i.dock_id,
            arrival_date: i.arrival_date,
            departure_date: i.departure_date,
        }
    }
}

/// One audit trail line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryDto {
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
}

impl From<AuditEntry> for AuditEntryDto {
    fn from(e: AuditEntry) -> Self {
        Self {
            action: e.action,
            user: e.user,
            timestamp: e.timestamp,
            details: e.details,
        }
    }
}
