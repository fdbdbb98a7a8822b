//! Pet Health API - multi-tenant pet health records over REST
//!
//! Owners keep their pets, vaccinations, health records and appointments;
//! administrators see everything and manage the subscription plan catalog.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, validation and status derivation
//! - **services**: Use cases with ownership checks
//! - **infra**: Database, migrations, repositories and Redis
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Bootstrap an administrator
//! cargo run -- create-admin --email admin@example.com --password 'SecurePass123!'
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{CurrentUser, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
