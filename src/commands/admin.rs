//! Create-admin command - bootstraps an administrator account.

use std::sync::Arc;

use crate::cli::args::CreateAdminArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::{UserManager, UserService};

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let users = UserManager::new(Arc::new(Persistence::new(db.get_connection())));
    let admin = users
        .create_admin(&args.email, &args.password, args.first_name, args.last_name)
        .await?;

    println!("Administrator ready: {} ({})", admin.email, admin.id);
    Ok(())
}
