//! Notification handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{CreateNotification, CurrentUser, NotificationResponse, UpdateNotification};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/my_notifications", get(my_notifications))
        .route("/unread", get(unread_notifications))
        .route(
            "/:id",
            get(get_notification)
                .put(replace_notification)
                .patch(update_notification)
                .delete(delete_notification),
        )
        .route("/:id/mark-read", post(mark_read))
}

/// Own notifications, or all for an admin
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated notifications", body = [NotificationResponse]))
)]
pub async fn list_notifications(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let page = state.notification_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Notifications retrieved successfully."))
}

/// The requester's notifications
#[utoipa::path(
    get,
    path = "/api/notifications/my_notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated notifications", body = [NotificationResponse]))
)]
pub async fn my_notifications(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let page = state
        .notification_service
        .my_notifications(&current_user, params)
        .await?;
    Ok(paginated(page, &params, "Notifications retrieved successfully."))
}

/// The requester's unread notifications
#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated notifications", body = [NotificationResponse]))
)]
pub async fn unread_notifications(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let page = state.notification_service.unread(&current_user, params).await?;
    Ok(paginated(page, &params, "Unread notifications retrieved successfully."))
}

/// Create a notification (admin only)
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created successfully", body = NotificationResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn create_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNotification>,
) -> AppResult<Created<NotificationResponse>> {
    let notification = state
        .notification_service
        .create(&current_user, payload)
        .await?;
    Ok(Created(notification.into(), "Notification created successfully."))
}

/// Get a notification
#[utoipa::path(
    get,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn get_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state.notification_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(notification.into()))
}

/// Replace a notification (admin only)
#[utoipa::path(
    put,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    request_body = CreateNotification,
    responses(
        (status = 200, description = "Notification updated successfully", body = NotificationResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn replace_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateNotification>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state
        .notification_service
        .update(&current_user, id, UpdateNotification::from(payload))
        .await?;
    Ok(ApiResponse::with_message(
        notification.into(),
        "Notification updated successfully.",
    ))
}

/// Partially update a notification (admin only)
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    request_body = UpdateNotification,
    responses(
        (status = 200, description = "Notification updated successfully", body = NotificationResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn update_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateNotification>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state
        .notification_service
        .update(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(
        notification.into(),
        "Notification updated successfully.",
    ))
}

/// Delete a notification (admin only)
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted successfully"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Notification deleted successfully."))
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/mark-read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state
        .notification_service
        .mark_read(&current_user, id)
        .await?;
    Ok(ApiResponse::with_message(
        notification.into(),
        "Notification marked as read.",
    ))
}
