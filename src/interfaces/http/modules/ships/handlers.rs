//! Ship API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{RegisterShipRequest, ShipDto};
use crate::application::ShipService;
use crate::domain::NewShip;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, PageQuery, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Ship handler state
#[derive(Clone)]
pub struct ShipsState {
    pub service: Arc<ShipService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/ships",
    tag = "Ships",
    request_body = RegisterShipRequest,
    responses(
        (status = 201, description = "Ship registered", body = ApiResponse<ShipDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role may not register ships"),
        (status = 409, description = "IMO number already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_ship(
    State(state): State<ShipsState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<RegisterShipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShipDto>>), ApiError> {
    let new = NewShip::try_from(body)?;
    let ship = state.service.register(new, &user.actor()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(ship.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/ships",
    tag = "Ships",
    params(PageQuery),
    responses(
        (status = 200, description = "Registered ships, newest first", body = ApiResponse<PaginatedResponse<ShipDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_ships(
    State(state): State<ShipsState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<ShipDto>>>, ApiError> {
    let result = state.service.list(page.into()).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/ships/{id}",
    tag = "Ships",
    params(("id" = String, Path, description = "Ship ID")),
    responses(
        (status = 200, description = "Ship details", body = ApiResponse<ShipDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_ship(
    State(state): State<ShipsState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShipDto>>, ApiError> {
    let ship = state.service.get(&id).await?;
    Ok(Json(ApiResponse::success(ship.into())))
}
