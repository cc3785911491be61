//! Ship DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{NewShip, Ship};
use crate::shared::errors::DomainError;

/// Ship API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShipDto {
    pub id: String,
    pub imo_number: String,
    pub name: String,
    /// container, bulk_carrier, tanker, ro_ro, passenger, general_cargo, other
    pub ship_type: String,
    pub length: f64,
    pub gross_tonnage: f64,
    pub flag: String,
    pub company: String,
    pub registered_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<Ship> for ShipDto {
    fn from(s: Ship) -> Self {
        Self {
            id: s.id,
            imo_number: s.imo_number,
            name: s.name,
            ship_type: s.ship_type.to_string(),
            length: s.length,
            gross_tonnage: s.gross_tonnage,
            flag: s.flag,
            company: s.company,
            registered_by: s.registered_by,
            created_at: s.created_at,
        }
    }
}

/// Register ship request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterShipRequest {
    /// Seven-digit IMO number
    #[validate(length(equal = 7))]
    pub imo_number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub ship_type: String,
    #[validate(range(exclusive_min = 0.0))]
    pub length: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub gross_tonnage: f64,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub flag: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub company: String,
}

impl TryFrom<RegisterShipRequest> for NewShip {
    type Error = DomainError;

    fn try_from(r: RegisterShipRequest) -> Result<Self, Self::Error> {
        Ok(NewShip {
            ship_type: r.ship_type.parse()?,
            imo_number: r.imo_number,
            name: r.name,
            length: r.length,
            gross_tonnage: r.gross_tonnage,
            flag: r.flag,
            company: r.company,
        })
    }
}
