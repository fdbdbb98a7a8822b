//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::api::AppState;
use crate::errors::AppError;

/// Resolve the bearer access token into a
/// [`CurrentUser`](crate::domain::CurrentUser) request extension.
///
/// A missing header, a malformed scheme, a refresh token or an
/// inactive account all answer 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let current_user = state.auth_service.authenticate(bearer.token()).await?;
    tracing::debug!(user_id = %current_user.id, "Request authenticated");

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
