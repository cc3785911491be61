//! Customs clearance handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::{AuditEntryDto, ClearanceItemDto, UpdateCustomsStatusRequest};
use crate::application::ClearanceService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::berthings::CargoDto;

/// Customs handler state
#[derive(Clone)]
pub struct CustomsState {
    pub service: Arc<ClearanceService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/customs/cargo",
    tag = "Customs",
    responses(
        (status = 200, description = "Cargo on approved or in-progress berthings not yet cleared or held", body = ApiResponse<Vec<ClearanceItemDto>>),
        (status = 403, description = "Customs brokers and administrators only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_cargo_for_clearance(
    State(state): State<CustomsState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ClearanceItemDto>>>, ApiError> {
    let items = state.service.cargo_for_clearance(&user.actor()).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(ClearanceItemDto::from).collect(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/customs/cargo/{cargo_id}/status",
    tag = "Customs",
    params(("cargo_id" = String, Path, description = "Cargo line ID")),
    request_body = UpdateCustomsStatusRequest,
    responses(
        (status = 200, description = "Updated cargo line", body = ApiResponse<CargoDto>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Line is handled by another broker"),
        (status = 404, description = "Cargo not found"),
        (status = 409, description = "Transition not allowed from the current customs status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_customs_status(
    State(state): State<CustomsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(cargo_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateCustomsStatusRequest>,
) -> Result<Json<ApiResponse<CargoDto>>, ApiError> {
    let cargo = state
        .service
        .update_customs_status(&cargo_id, &body.status, body.notes, &user.actor())
        .await?;
    Ok(Json(ApiResponse::success(cargo.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/customs/cargo/{cargo_id}/history",
    tag = "Customs",
    params(("cargo_id" = String, Path, description = "Cargo line ID")),
    responses(
        (status = 200, description = "Audit trail, oldest first", body = ApiResponse<Vec<AuditEntryDto>>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Cargo not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clearance_history(
    State(state): State<CustomsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(cargo_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    let trail = state
        .service
        .clearance_history(&cargo_id, &user.actor())
        .await?;
    Ok(Json(ApiResponse::success(
        trail.into_iter().map(AuditEntryDto::from).collect(),
    )))
}
