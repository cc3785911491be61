//! Berthing DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::BerthingUpdate;
use crate::domain::{
    Berthing, BerthingFilter, BerthingStatus, CargoDetail, DocumentRef, NewBerthing, NewCargo,
    SchedulePatch,
};
use crate::shared::errors::DomainError;
use crate::shared::PaginationParams;

/// Cargo line as returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CargoDto {
    pub id: String,
    pub description: String,
    pub weight: f64,
    pub cargo_type: String,
    pub quantity: f64,
    pub unit: String,
    pub cargo_owner_id: String,
    /// not_verified, in_progress, verified, cleared or held
    pub customs_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_at: Option<DateTime<Utc>>,
}

impl From<CargoDetail> for CargoDto {
    fn from(c: CargoDetail) -> Self {
        Self {
            id: c.id,
            description: c.description,
            weight: c.weight,
            cargo_type: c.cargo_type.to_string(),
            quantity: c.quantity,
            unit: c.unit.to_string(),
            cargo_owner_id: c.cargo_owner_id,
            customs_status: c.customs_status.to_string(),
            notes: c.notes,
            processed_by: c.processed_by,
            cleared_by: c.cleared_by,
            cleared_at: c.cleared_at,
        }
    }
}

/// Attached document metadata
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DocumentDto {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub url: String,
    pub content_type: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl From<DocumentRef> for DocumentDto {
    fn from(d: DocumentRef) -> Self {
        Self {
            name: d.name,
            url: d.url,
            content_type: d.content_type,
            uploaded_at: Some(d.uploaded_at),
        }
    }
}

impl From<DocumentDto> for DocumentRef {
    fn from(d: DocumentDto) -> Self {
        Self {
            name: d.name,
            url: d.url,
            content_type: d.content_type,
            uploaded_at: d.uploaded_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Berthing API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BerthingDto {
    pub id: String,
    pub ship_id: String,
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    /// pending, approved, in_progress, rejected or completed
    pub status: String,
    pub cargo_details: Vec<CargoDto>,
    pub documents: Vec<DocumentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Berthing> for BerthingDto {
    fn from(b: Berthing) -> Self {
        Self {
            id: b.id,
            ship_id: b.ship_id,
            dock_id: b.dock_id,
            arrival_date: b.arrival_date,
            departure_date: b.departure_date,
            status: b.status.to_string(),
            cargo_details: b.cargo_details.into_iter().map(CargoDto::from).collect(),
            documents: b.documents.into_iter().map(DocumentDto::from).collect(),
            notes: b.notes,
            created_by: b.created_by,
            approved_by: b.approved_by,
            rejected_by: b.rejected_by,
            rejection_reason: b.rejection_reason,
            version: b.version,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Cargo line submitted with a berthing request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CargoRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: f64,
    pub cargo_type: String,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
    pub unit: String,
    #[validate(length(min = 1))]
    pub cargo_owner_id: String,
    pub notes: Option<String>,
}

impl TryFrom<CargoRequest> for NewCargo {
    type Error = DomainError;

    fn try_from(r: CargoRequest) -> Result<Self, Self::Error> {
        Ok(NewCargo {
            cargo_type: r.cargo_type.parse()?,
            unit: r.unit.parse()?,
            description: r.description,
            weight: r.weight,
            quantity: r.quantity,
            cargo_owner_id: r.cargo_owner_id,
            notes: r.notes,
        })
    }
}

/// Berthing request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBerthingRequest {
    #[validate(length(min = 1))]
    pub ship_id: String,
    #[validate(length(min = 1))]
    pub dock_id: String,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    #[validate(nested)]
    #[serde(default)]
    pub cargo_details: Vec<CargoRequest>,
    #[validate(nested)]
    #[serde(default)]
    pub documents: Vec<DocumentDto>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl TryFrom<CreateBerthingRequest> for NewBerthing {
    type Error = DomainError;

    fn try_from(r: CreateBerthingRequest) -> Result<Self, Self::Error> {
        let cargo = r
            .cargo_details
            .into_iter()
            .map(NewCargo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NewBerthing {
            ship_id: r.ship_id,
            dock_id: r.dock_id,
            arrival_date: r.arrival_date,
            departure_date: r.departure_date,
            cargo,
            documents: r.documents.into_iter().map(DocumentRef::from).collect(),
            notes: r.notes,
        })
    }
}

/// Generic update: either a status change (`completed`, `in_progress`) or
/// a reschedule of a pending request, never both
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBerthingRequest {
    pub status: Option<String>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub departure_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateBerthingRequest> for BerthingUpdate {
    fn from(r: UpdateBerthingRequest) -> Self {
        BerthingUpdate {
            status: r.status,
            schedule: SchedulePatch {
                arrival_date: r.arrival_date,
                departure_date: r.departure_date,
                notes: r.notes,
            },
        }
    }
}

/// Rejection request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectBerthingRequest {
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

/// List berthings query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBerthingsParams {
    /// Filter by status
    pub status: Option<String>,
    pub dock_id: Option<String>,
    pub ship_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl ListBerthingsParams {
    pub fn into_parts(self) -> Result<(BerthingFilter, PaginationParams), DomainError> {
        let filter = BerthingFilter {
            status: self
                .status
                .as_deref()
                .map(str::parse::<BerthingStatus>)
                .transpose()?,
            dock_id: self.dock_id,
            ship_id: self.ship_id,
            ..Default::default()
        };
        Ok((filter, PaginationParams::new(self.page, self.limit)))
    }
}
