//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_ACCESS_EXPIRATION_MINUTES,
    DEFAULT_JWT_REFRESH_EXPIRATION_DAYS, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub rate_limit_enabled: bool,
    jwt_secret: String,
    pub jwt_access_expiration_minutes: i64,
    pub jwt_refresh_expiration_days: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Empty means any origin is accepted
    pub cors_allowed_origins: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("rate_limit_enabled", &self.rate_limit_enabled)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_access_expiration_minutes", &self.jwt_access_expiration_minutes)
            .field("jwt_refresh_expiration_days", &self.jwt_refresh_expiration_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build or is too short.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        Self::build(jwt_secret, |key| env::var(key).ok())
    }

    /// Assemble a configuration from a secret and a variable lookup.
    fn build(jwt_secret: String, var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            redis_url: var("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            rate_limit_enabled: var("RATE_LIMIT_ENABLED")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            jwt_secret,
            jwt_access_expiration_minutes: var("JWT_ACCESS_EXPIRATION_MINUTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_ACCESS_EXPIRATION_MINUTES),
            jwt_refresh_expiration_days: var("JWT_REFRESH_EXPIRATION_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_REFRESH_EXPIRATION_DAYS),
            server_host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: var("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Configuration for tests, independent of the process environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            rate_limit_enabled: false,
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            jwt_access_expiration_minutes: DEFAULT_JWT_ACCESS_EXPIRATION_MINUTES,
            jwt_refresh_expiration_days: DEFAULT_JWT_REFRESH_EXPIRATION_DAYS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
