//! Authentication handlers.

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::RegisterUser;
use crate::errors::AppResult;
use crate::services::{AccessToken, AuthPayload};
use crate::types::{ApiResponse, Created};

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Refresh token exchange request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

/// Token verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,
}

/// Result of a successful verification
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedToken {
    pub user_id: uuid::Uuid,
    /// `access` or `refresh`
    pub kind: String,
    /// Expiry as a Unix timestamp
    pub expires_at: i64,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(login))
        .route("/token/refresh", post(refresh))
        .route("/token/verify", post(verify))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered successfully", body = AuthPayload),
        (status = 400, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> AppResult<Created<AuthPayload>> {
    let payload = state.auth_service.register(payload).await?;
    Ok(Created(payload, "User registered successfully."))
}

/// Log in and obtain a token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthPayload>> {
    let payload = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;
    Ok(ApiResponse::with_message(payload, "Login successful."))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<ApiResponse<AccessToken>> {
    let token = state.auth_service.refresh(&payload.refresh).await?;
    Ok(ApiResponse::with_message(token, "Token refreshed successfully."))
}

/// Check a token's signature and expiry
#[utoipa::path(
    post,
    path = "/api/auth/token/verify",
    tag = "Authentication",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token is valid", body = VerifiedToken),
        (status = 401, description = "Token is invalid or expired")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyRequest>,
) -> AppResult<ApiResponse<VerifiedToken>> {
    let claims = state.auth_service.verify(&payload.token)?;
    Ok(ApiResponse::with_message(
        VerifiedToken {
            user_id: claims.sub,
            kind: claims.kind,
            expires_at: claims.exp,
        },
        "Token is valid.",
    ))
}
