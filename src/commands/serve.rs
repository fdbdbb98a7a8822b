//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    db.run_migrations()
        .await
        .map_err(|e| AppError::internal(format!("Migrations failed: {}", e)))?;
    tracing::info!("Migrations applied");

    // Redis is optional; without it rate limiting is skipped
    let cache = match Cache::try_connect(&config).await {
        Ok(cache) => {
            tracing::info!("Redis cache connected");
            Some(Arc::new(cache))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, rate limiting disabled");
            None
        }
    };

    let addr = config.server_addr();
    let app_state = AppState::from_config(Arc::new(db), cache, config);
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
