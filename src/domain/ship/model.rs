//! Ship domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipType {
    Container,
    BulkCarrier,
    Tanker,
    RoRo,
    Passenger,
    GeneralCargo,
    Other,
}

impl ShipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::BulkCarrier => "bulk_carrier",
            Self::Tanker => "tanker",
            Self::RoRo => "ro_ro",
            Self::Passenger => "passenger",
            Self::GeneralCargo => "general_cargo",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(Self::Container),
            "bulk_carrier" => Ok(Self::BulkCarrier),
            "tanker" => Ok(Self::Tanker),
            "ro_ro" => Ok(Self::RoRo),
            "passenger" => Ok(Self::Passenger),
            "general_cargo" => Ok(Self::GeneralCargo),
            "other" => Ok(Self::Other),
            other => Err(DomainError::Validation(format!("Unknown ship type '{}'", other))),
        }
    }
}

/// Registration payload
#[derive(Debug, Clone)]
pub struct NewShip {
    pub imo_number: String,
    pub name: String,
    pub ship_type: ShipType,
    pub length: f64,
    pub gross_tonnage: f64,
    pub flag: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: String,
    /// IMO number, seven digits, unique across the registry
    pub imo_number: String,
    pub name: String,
    pub ship_type: ShipType,
    /// Length overall, metres
    pub length: f64,
    pub gross_tonnage: f64,
    pub flag: String,
    pub company: String,
    pub registered_by: String,
    pub created_at: DateTime<Utc>,
}

impl Ship {
    pub fn register(new: NewShip, registered_by: &str) -> DomainResult<Self> {
        let imo_number = new.imo_number.trim().to_string();
        if imo_number.len() != 7 || !imo_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::Validation(
                "imo_number must be exactly 7 digits".into(),
            ));
        }
        if new.name.trim().is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        if !(new.length > 0.0) || !(new.gross_tonnage > 0.0) {
            return Err(DomainError::Validation(
                "length and gross_tonnage must be positive".into(),
            ));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            imo_number,
            name: new.name.trim().to_string(),
            ship_type: new.ship_type,
            length: new.length,
            gross_tonnage: new.gross_tonnage,
            flag: new.flag,
            company: new.company,
            registered_by: registered_by.to_string(),
            created_at: Utc::now(),
        })
    }
}
