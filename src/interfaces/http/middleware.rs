//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::{ApiResponse, ErrorCode};
use crate::domain::{Actor, UserRole};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    UnknownRole,
}

/// Authentication state
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| AuthError::UnknownRole)?;
        Ok(Self {
            user_id: claims.sub,
            username: claims.username,
            role,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return auth_error_response(AuthError::InvalidToken);
        }
    };

    match AuthenticatedUser::from_claims(claims) {
        Ok(user) => {
            let span = tracing::Span::current();
            span.record("user_id", user.user_id.as_str());
            span.record("role", user.role.as_str());
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid or expired authentication token",
        AuthError::UnknownRole => "Token carries an unknown role",
    };

    let body = Json(ApiResponse::<()>::error("Unauthorized", message));
    let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
    response.extensions_mut().insert(ErrorCode("Unauthorized"));
    response
}
