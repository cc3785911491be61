//! Dock DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Dock, NewDock};

/// Dock API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DockDto {
    pub id: String,
    pub name: String,
    pub length: f64,
    pub max_draft: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// available, occupied or maintenance
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dock> for DockDto {
    fn from(d: Dock) -> Self {
        Self {
            id: d.id,
            name: d.name,
            length: d.length,
            max_draft: d.max_draft,
            location: d.location,
            status: d.status.to_string(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Register dock request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDockRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0))]
    pub length: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub max_draft: f64,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

impl From<RegisterDockRequest> for NewDock {
    fn from(r: RegisterDockRequest) -> Self {
        NewDock {
            name: r.name,
            length: r.length,
            max_draft: r.max_draft,
            location: r.location,
        }
    }
}

/// List docks query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDocksParams {
    /// Filter by status (available, occupied, maintenance)
    pub status: Option<String>,
}

/// Maintenance toggle request
#[derive(Debug, Deserialize, ToSchema)]
pub struct MaintenanceRequest {
    /// `true` takes an available dock out of service, `false` returns it
    pub enabled: bool,
}
