//! Refresh-statuses command - re-derives date-driven statuses.

use chrono::Utc;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::maintenance::refresh_statuses;

/// Execute the refresh-statuses command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let persistence = Persistence::new(db.get_connection());
    let refreshed = refresh_statuses(&persistence, Utc::now().date_naive()).await?;

    println!(
        "Refreshed {} vaccination(s) and {} subscription(s)",
        refreshed.vaccinations, refreshed.subscriptions
    );
    Ok(())
}
