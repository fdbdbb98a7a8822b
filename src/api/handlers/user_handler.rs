//! User and profile handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{ChangePassword, CurrentUser, ProfileResponse, UpdateProfile, UpdateUser, UserResponse};
use crate::errors::AppResult;
use crate::types::{ApiResponse, PaginationParams};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/me",
            get(get_me).put(update_me).patch(update_me).delete(delete_me),
        )
        .route("/change-password", post(change_password))
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile).put(update_my_profile).patch(update_my_profile))
        .route(
            "/:user_id",
            get(get_profile).put(update_profile).patch(update_profile),
        )
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let page = state.user_service.list_users(&current_user, params).await?;
    Ok(paginated(page, &params, "Users retrieved successfully."))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .get_user(&current_user, current_user.id)
        .await?;
    Ok(ApiResponse::success(user.into()))
}

/// Update the current user
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role or active status changed by a non-admin")
    )
)]
pub async fn update_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_user(&current_user, current_user.id, payload)
        .await?;
    Ok(ApiResponse::with_message(user.into(), "User updated successfully."))
}

/// Self-deletion is always refused
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 400, description = "You cannot delete your own account.")
    )
)]
pub async fn delete_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state
        .user_service
        .delete_user(&current_user, current_user.id)
        .await?;
    Ok(ApiResponse::message("User deactivated successfully."))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/users/change-password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Validation error")
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePassword>,
) -> AppResult<ApiResponse<()>> {
    state
        .user_service
        .change_password(&current_user, payload)
        .await?;
    Ok(ApiResponse::message("Password changed successfully."))
}

/// Get user by ID (self or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_user(&current_user, id).await?;
    Ok(ApiResponse::success(user.into()))
}

/// Update user (self or admin; role and is_active admin only)
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_user(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(user.into(), "User updated successfully."))
}

/// Deactivate a user (admin only, never yourself)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated successfully"),
        (status = 400, description = "You cannot delete your own account."),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.delete_user(&current_user, id).await?;
    Ok(ApiResponse::message("User deactivated successfully."))
}

/// Get the current user's profile, creating it on first access
#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
pub async fn get_my_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .user_service
        .get_profile(&current_user, current_user.id)
        .await?;
    Ok(ApiResponse::success(profile))
}

/// Update the current user's profile
#[utoipa::path(
    patch,
    path = "/api/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated successfully", body = ProfileResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn update_my_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .user_service
        .update_profile(&current_user, current_user.id, payload)
        .await?;
    Ok(ApiResponse::with_message(profile, "Profile updated successfully."))
}

/// Get a user's profile (self or admin)
#[utoipa::path(
    get,
    path = "/api/profiles/{user_id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.user_service.get_profile(&current_user, user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// Update a user's profile (self or admin)
#[utoipa::path(
    patch,
    path = "/api/profiles/{user_id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated successfully", body = ProfileResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .user_service
        .update_profile(&current_user, user_id, payload)
        .await?;
    Ok(ApiResponse::with_message(profile, "Profile updated successfully."))
}
