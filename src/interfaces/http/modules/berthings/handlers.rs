//! Berthing API handlers
//!
//! Thin adapters over `BerthAllocationService`; authorization and state
//! checks happen in the service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    BerthingDto, CreateBerthingRequest, ListBerthingsParams, RejectBerthingRequest,
    UpdateBerthingRequest,
};
use crate::application::BerthAllocationService;
use crate::domain::NewBerthing;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Berthing handler state
#[derive(Clone)]
pub struct BerthingsState {
    pub service: Arc<BerthAllocationService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/berthings",
    tag = "Berthings",
    request_body = CreateBerthingRequest,
    responses(
        (status = 201, description = "Berthing requested, dock reserved", body = ApiResponse<BerthingDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role may not request berthings"),
        (status = 404, description = "Ship or dock not found"),
        (status = 409, description = "Dock is not available")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<CreateBerthingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BerthingDto>>), ApiError> {
    let new = NewBerthing::try_from(body)?;
    let berthing = state.service.create(new, &user.actor()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(berthing.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/berthings",
    tag = "Berthings",
    params(ListBerthingsParams),
    responses(
        (status = 200, description = "Berthings visible to the caller, newest first", body = ApiResponse<PaginatedResponse<BerthingDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_berthings(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListBerthingsParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<BerthingDto>>>, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state.service.list(filter, page, &user.actor()).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/berthings/{id}",
    tag = "Berthings",
    params(("id" = String, Path, description = "Berthing ID")),
    responses(
        (status = 200, description = "Berthing details", body = ApiResponse<BerthingDto>),
        (status = 403, description = "Not visible to the caller"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BerthingDto>>, ApiError> {
    let berthing = state.service.get(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(berthing.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/berthings/{id}",
    tag = "Berthings",
    params(("id" = String, Path, description = "Berthing ID")),
    request_body = UpdateBerthingRequest,
    responses(
        (status = 200, description = "Updated berthing", body = ApiResponse<BerthingDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateBerthingRequest>,
) -> Result<Json<ApiResponse<BerthingDto>>, ApiError> {
    let berthing = state
        .service
        .update(&id, body.into(), &user.actor())
        .await?;
    Ok(Json(ApiResponse::success(berthing.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/berthings/{id}/approve",
    tag = "Berthings",
    params(("id" = String, Path, description = "Berthing ID")),
    responses(
        (status = 200, description = "Approved berthing", body = ApiResponse<BerthingDto>),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BerthingDto>>, ApiError> {
    let berthing = state.service.approve(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(berthing.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/berthings/{id}/reject",
    tag = "Berthings",
    params(("id" = String, Path, description = "Berthing ID")),
    request_body = RejectBerthingRequest,
    responses(
        (status = 200, description = "Rejected berthing, dock released", body = ApiResponse<BerthingDto>),
        (status = 400, description = "Reason is required"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<RejectBerthingRequest>,
) -> Result<Json<ApiResponse<BerthingDto>>, ApiError> {
    let berthing = state
        .service
        .reject(&id, &body.reason, &user.actor())
        .await?;
    Ok(Json(ApiResponse::success(berthing.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/berthings/{id}",
    tag = "Berthings",
    params(("id" = String, Path, description = "Berthing ID")),
    responses(
        (status = 200, description = "Berthing deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Berthing is in progress or completed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_berthing(
    State(state): State<BerthingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.service.delete(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
