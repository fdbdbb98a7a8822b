//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic conversion into the `{success: false, ...}` envelope.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::config::GENERIC_SERVER_ERROR_MESSAGE;

/// Key used for errors that belong to the payload as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const DEFAULT_FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

/// Field name -> messages map rendered under `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map holding one message for one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another map into this one.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, else a validation error.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::invalid(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let field = if field == "__all__" {
                NON_FIELD_ERRORS.to_string()
            } else {
                field.to_string()
            };
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                fields.add(field.clone(), message);
            }
        }
        fields
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("User account is disabled.")]
    AccountDisabled,

    // Resource errors
    #[error("Resource not found.")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    // Validation
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    #[error("{0}")]
    BadRequest(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    // External service errors
    #[error("Database error")]
    Database(#[from] DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Integrity violations reported by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Integrity {
    Duplicate,
    InvalidReference,
    Other,
}

fn integrity_violation(err: &DbErr) -> Option<Integrity> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Some(Integrity::Duplicate),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => Some(Integrity::InvalidReference),
        _ => {
            let text = err.to_string().to_lowercase();
            (text.contains("violates") && text.contains("constraint")).then_some(Integrity::Other)
        }
    }
}

/// Error envelope body
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
    error_code: &'static str,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "PERMISSION_DENIED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::AccountDisabled => "ACCOUNT_DISABLED",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::Database(e) => match integrity_violation(e) {
                Some(Integrity::Duplicate) => "DUPLICATE_ENTRY",
                Some(Integrity::InvalidReference) => "INVALID_REFERENCE",
                Some(Integrity::Other) => "INTEGRITY_ERROR",
                None => "SERVER_ERROR",
            },
            AppError::Internal(_) => "SERVER_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) | AppError::AccountDisabled => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(e) => match integrity_violation(e) {
                Some(Integrity::Duplicate) => StatusCode::CONFLICT,
                Some(_) => StatusCode::BAD_REQUEST,
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => match integrity_violation(e) {
                Some(Integrity::Duplicate) => {
                    tracing::warn!(error = %e, "Unique constraint violation");
                    "A record with these values already exists.".to_string()
                }
                Some(Integrity::InvalidReference) => {
                    tracing::warn!(error = %e, "Foreign key violation");
                    "Invalid reference to a related resource.".to_string()
                }
                Some(Integrity::Other) => {
                    tracing::warn!(error = %e, "Integrity constraint violation");
                    "The data violates an integrity constraint.".to_string()
                }
                None => {
                    tracing::error!("Database error: {:?}", e);
                    GENERIC_SERVER_ERROR_MESSAGE.to_string()
                }
            },
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Token is invalid or expired.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                GENERIC_SERVER_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            message: self.user_message(),
            errors: self.field_errors(),
            error_code: self.code(),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            let headers = response.headers_mut();
            headers.insert("Retry-After", HeaderValue::from(retry_after));
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        }

        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::invalid(FieldErrors::from(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Invalid query parameter: {}", rejection.body_text()))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Validation failure not tied to one field.
    pub fn validation(msg: impl Into<String>) -> Self {
        let message = msg.into();
        AppError::Validation {
            errors: FieldErrors::single(NON_FIELD_ERRORS, message.clone()),
            message,
        }
    }

    /// Validation failure for a single field.
    pub fn field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::invalid(FieldErrors::single(field, msg))
    }

    /// Validation failure carrying a full field-error map.
    pub fn invalid(errors: FieldErrors) -> Self {
        AppError::Validation {
            message: "Validation failed.".to_string(),
            errors,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden(DEFAULT_FORBIDDEN_MESSAGE.to_string())
    }

    pub fn forbidden_with(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
