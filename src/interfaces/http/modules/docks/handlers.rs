//! Dock API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{DockDto, ListDocksParams, MaintenanceRequest, RegisterDockRequest};
use crate::application::DockService;
use crate::domain::DockStatus;
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Dock handler state
#[derive(Clone)]
pub struct DocksState {
    pub service: Arc<DockService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/docks",
    tag = "Docks",
    request_body = RegisterDockRequest,
    responses(
        (status = 201, description = "Dock registered", body = ApiResponse<DockDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Administrators only"),
        (status = 409, description = "Dock name already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_dock(
    State(state): State<DocksState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<RegisterDockRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DockDto>>), ApiError> {
    let dock = state.service.register(body.into(), &user.actor()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dock.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/docks",
    tag = "Docks",
    params(ListDocksParams),
    responses(
        (status = 200, description = "Docks ordered by name", body = ApiResponse<Vec<DockDto>>),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_docks(
    State(state): State<DocksState>,
    Query(params): Query<ListDocksParams>,
) -> Result<Json<ApiResponse<Vec<DockDto>>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<DockStatus>)
        .transpose()?;
    let docks = state.service.list(status).await?;
    Ok(Json(ApiResponse::success(
        docks.into_iter().map(DockDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/docks/{id}",
    tag = "Docks",
    params(("id" = String, Path, description = "Dock ID")),
    responses(
        (status = 200, description = "Dock details", body = ApiResponse<DockDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dock(
    State(state): State<DocksState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DockDto>>, ApiError> {
    let dock = state.service.get(&id).await?;
    Ok(Json(ApiResponse::success(dock.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/docks/{id}/maintenance",
    tag = "Docks",
    params(("id" = String, Path, description = "Dock ID")),
    request_body = MaintenanceRequest,
    responses(
        (status = 200, description = "Dock after the toggle", body = ApiResponse<DockDto>),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Dock is occupied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_maintenance(
    State(state): State<DocksState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<MaintenanceRequest>,
) -> Result<Json<ApiResponse<DockDto>>, ApiError> {
    let dock = state
        .service
        .set_maintenance(&id, body.enabled, &user.actor())
        .await?;
    Ok(Json(ApiResponse::success(dock.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/docks/{id}",
    tag = "Docks",
    params(("id" = String, Path, description = "Dock ID")),
    responses(
        (status = 200, description = "Dock deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Dock is occupied or referenced by berthings")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_dock(
    State(state): State<DocksState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.service.delete(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
