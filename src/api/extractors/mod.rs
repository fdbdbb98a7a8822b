//! Request extractors whose rejections use the error envelope.

use axum::extract::{FromRequestParts, Path, Query};

use crate::errors::AppError;

mod validated_json;

pub use validated_json::ValidatedJson;

/// `Path` that rejects with a 400 envelope.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Query` that rejects with a 400 envelope.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
