//! Notification inbox handlers
//!
//! Every route acts on the caller's own inbox, except the staff-only
//! direct send.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    AffectedDto, ListNotificationsParams, NotificationDto, SendNotificationRequest,
    UnreadCountDto,
};
use crate::application::NotificationService;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Notification handler state
#[derive(Clone)]
pub struct NotificationsState {
    pub service: Arc<NotificationService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    params(ListNotificationsParams),
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = ApiResponse<PaginatedResponse<NotificationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListNotificationsParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<NotificationDto>>>, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state.service.list(&user.actor(), &filter, page).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    tag = "Notifications",
    request_body = SendNotificationRequest,
    responses(
        (status = 201, description = "Notifications created, one per recipient", body = ApiResponse<Vec<NotificationDto>>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Administrators only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_notification(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<SendNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<NotificationDto>>>), ApiError> {
    let created = state
        .service
        .send_direct(body.recipients, &body.title, &body.message, &user.actor())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            created.into_iter().map(NotificationDto::from).collect(),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    tag = "Notifications",
    responses(
        (status = 200, description = "Unread notifications of the caller", body = ApiResponse<UnreadCountDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unread_count(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UnreadCountDto>>, ApiError> {
    let count = state.service.unread_count(&user.actor()).await?;
    Ok(Json(ApiResponse::success(UnreadCountDto { count })))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<NotificationDto>),
        (status = 403, description = "Not the caller's notification"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let notification = state.service.mark_read(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    tag = "Notifications",
    responses(
        (status = 200, description = "Number of notifications marked read", body = ApiResponse<AffectedDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_read(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<AffectedDto>>, ApiError> {
    let affected = state.service.mark_all_read(&user.actor()).await?;
    Ok(Json(ApiResponse::success(AffectedDto { affected })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the caller's notification"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_notification(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.service.delete(&id, &user.actor()).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Number of read notifications removed", body = ApiResponse<AffectedDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_read(
    State(state): State<NotificationsState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<AffectedDto>>, ApiError> {
    let affected = state.service.clear_read(&user.actor()).await?;
    Ok(Json(ApiResponse::success(AffectedDto { affected })))
}
