//! Bearer tokens (HS256)
//!
//! Tokens come from the port's identity provider. The service checks the
//! signature, `iss` and `exp` and reads the caller's id and role from them.
//! [`create_token`] mints tokens with the same secret for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

const DEFAULT_LIFETIME_HOURS: i64 = 24;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Required `iss` claim
    pub issuer: String,
    /// Only used when minting
    pub expiration_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration_hours: DEFAULT_LIFETIME_HOURS,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub username: String,
    /// Snake-case [`UserRole`]; parsed by the auth middleware so an unknown
    /// role is reported as such rather than as a bad signature
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn create_token(
    user_id: &str,
    username: &str,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, JwtError> {
    let issued = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_owned(),
        username: username.to_owned(),
        role: role.as_str().to_owned(),
        iss: config.issuer.clone(),
        iat: issued.timestamp(),
        exp: (issued + Duration::hours(config.expiration_hours)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, config: &JwtConfig) -> Result<TokenClaims, JwtError> {
    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let config = JwtConfig::new("test-secret", "harbor");
        let token = create_token("u-1", "ana", UserRole::CustomsBroker, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, "customs_broker");
    }

    #[test]
    fn rejects_wrong_issuer_and_secret() {
        let config = JwtConfig::new("test-secret", "harbor");
        let token = create_token("u-1", "ana", UserRole::Admin, &config).unwrap();

        assert!(verify_token(&token, &JwtConfig::new("test-secret", "elsewhere")).is_err());
        assert!(verify_token(&token, &JwtConfig::new("other-secret", "harbor")).is_err());
    }

    #[test]
    fn rejects_tokens_without_subject() {
        #[derive(Serialize)]
        struct Partial<'a> {
            iss: &'a str,
            exp: i64,
            username: &'a str,
            role: &'a str,
            iat: i64,
        }
        let config = JwtConfig::new("test-secret", "harbor");
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &Partial { iss: "harbor", exp: now + 600, username: "x", role: "admin", iat: now },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut config = JwtConfig::new("test-secret", "harbor");
        config.expiration_hours = -2;
        let token = create_token("u-1", "ana", UserRole::Viewer, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
