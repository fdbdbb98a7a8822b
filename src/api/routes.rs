//! Application route configuration.

use std::any::Any;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    appointment_routes, auth_routes, health_record_routes, notification_routes, pet_routes,
    plan_routes, profile_routes, subscription_routes, user_routes, vaccination_routes,
};
use super::middleware::{
    auth_middleware, cors_layer, rate_limit_auth_middleware, rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppError;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Public authentication routes (stricter rate limiting)
    let auth = auth_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_auth_middleware,
    ));

    // Everything else requires a bearer token plus general rate limiting
    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/profiles", profile_routes())
        .nest("/pets", pet_routes())
        .nest("/health/vaccinations", vaccination_routes())
        .nest("/health/health-records", health_record_routes())
        .nest("/appointments", appointment_routes())
        .nest("/notifications", notification_routes())
        .nest("/subscriptions/plans", plan_routes())
        .nest("/subscriptions/subscriptions", subscription_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let cors = cors_layer(&state.cors_allowed_origins);

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", Router::new().nest("/auth", auth).merge(protected))
        .fallback(not_found)
        // Global middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Welcome to the Pet Health API"
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Turn a handler panic into the generic 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(format!("handler panicked: {detail}")).into_response()
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn disabled() -> Self {
        Self {
            status: "disabled",
            error: None,
        }
    }

    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match &state.database {
        Some(database) => ServiceStatus::from_result(database.ping().await),
        None => ServiceStatus::disabled(),
    };

    let redis_status = match &state.cache {
        Some(cache) => ServiceStatus::from_result(cache.ping().await),
        None => ServiceStatus::disabled(),
    };

    let degraded = db_status.is_unhealthy() || redis_status.is_unhealthy();

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}
