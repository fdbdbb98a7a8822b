//! Shared types: envelopes, pagination and partial updates.

mod pagination;
pub mod patch;
mod response;

pub use pagination::{Page, Paginated, PaginationMeta, PaginationParams};
pub use response::{ApiResponse, Created};
