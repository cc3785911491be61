use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::errors::DomainError;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    MaritimeAgent,
    CargoOwner,
    CustomsBroker,
    Admin,
    PortAuthority,
    Viewer,
}

impl UserRole {
    pub const ADMINISTRATIVE: [UserRole; 2] = [UserRole::Admin, UserRole::PortAuthority];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaritimeAgent => "maritime_agent",
            Self::CargoOwner => "cargo_owner",
            Self::CustomsBroker => "customs_broker",
            Self::Admin => "admin",
            Self::PortAuthority => "port_authority",
            Self::Viewer => "viewer",
        }
    }

    /// Admins and port authorities run the berth workflow and bypass
    /// ownership checks.
    pub fn is_administrative(&self) -> bool {
        Self::ADMINISTRATIVE.contains(self)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Viewer
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maritime_agent" => Ok(Self::MaritimeAgent),
            "cargo_owner" => Ok(Self::CargoOwner),
            "customs_broker" => Ok(Self::CustomsBroker),
            "admin" => Ok(Self::Admin),
            "port_authority" => Ok(Self::PortAuthority),
            "viewer" => Ok(Self::Viewer),
            other => Err(DomainError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// User model
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_and_port_authority_are_administrative() {
        assert!(UserRole::Admin.is_administrative());
        assert!(UserRole::PortAuthority.is_administrative());
        for role in [
            UserRole::MaritimeAgent,
            UserRole::CargoOwner,
            UserRole::CustomsBroker,
            UserRole::Viewer,
        ] {
            assert!(!role.is_administrative(), "{role} must not be administrative");
        }
    }

    #[test]
    fn role_strings_round_trip() {
        let role: UserRole = "customs_broker".parse().unwrap();
        assert_eq!(role, UserRole::CustomsBroker);
        assert_eq!(role.as_str(), "customs_broker");
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        let err = "captain".parse::<UserRole>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
