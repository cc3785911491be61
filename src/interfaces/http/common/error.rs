//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::shared::errors::DomainError;

/// Taxonomy code of an error response, left in the response extensions
/// for the metrics layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

/// Handler error; renders the standard envelope with the error's code
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Conflict(_)
            | DomainError::StaleWrite { .. }
            | DomainError::StateError(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            // Storage details stay in the logs
            DomainError::Storage(detail) => {
                error!(error = %detail, "Request failed with storage error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let code = self.0.code();
        let mut response = (status, Json(ApiResponse::<()>::error(code, message))).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Dock", "d"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::StateError("x".into()), StatusCode::CONFLICT),
            (
                DomainError::StaleWrite {
                    entity: "Berthing",
                    id: "b".into(),
                },
                StatusCode::CONFLICT,
            ),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn storage_detail_is_not_exposed() {
        let response = ApiError(DomainError::Storage("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "InternalError");
        assert!(!body["error"].as_str().unwrap().contains("disk"));
    }

    #[test]
    fn error_code_is_left_for_the_metrics_layer() {
        let response = ApiError(DomainError::Conflict("Quay 7 is occupied".into())).into_response();
        assert_eq!(
            response.extensions().get::<ErrorCode>(),
            Some(&ErrorCode("Conflict"))
        );
    }
}
