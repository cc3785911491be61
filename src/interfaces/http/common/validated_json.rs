//! JSON body extractor with `validator` rules
//!
//! Malformed bodies and rule violations both surface as
//! `DomainError::Validation`, so they share the 400 `ValidationError`
//! envelope with validation failures raised deeper in the workflow.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::ApiError;
use crate::shared::errors::DomainError;

/// Like `axum::Json<T>`, but the value has passed `Validate::validate`.
///
/// ```ignore
/// async fn create(ValidatedJson(body): ValidatedJson<CreateBerthingRequest>) { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError(DomainError::Validation(format!(
                    "Invalid JSON body: {}",
                    rejection.body_text()
                )))
            })?;

        value
            .validate()
            .map_err(|errors| ApiError(DomainError::Validation(describe(&errors))))?;
        Ok(ValidatedJson(value))
    }
}

/// Flatten nested rule violations into `path: message` pairs, e.g.
/// `cargo_details[0].weight: range`.
fn describe(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect(errors, "", &mut lines);
    lines.sort();
    if lines.is_empty() {
        "Validation failed".to_string()
    } else {
        lines.join("; ")
    }
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(format!("{}: {}", path, reason));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}
