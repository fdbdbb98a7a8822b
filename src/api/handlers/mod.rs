//! HTTP request handlers.

pub mod appointment_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod notification_handler;
pub mod pet_handler;
pub mod subscription_handler;
pub mod user_handler;

pub use appointment_handler::appointment_routes;
pub use auth_handler::auth_routes;
pub use health_handler::{health_record_routes, vaccination_routes};
pub use notification_handler::notification_routes;
pub use pet_handler::pet_routes;
pub use subscription_handler::{plan_routes, subscription_routes};
pub use user_handler::{profile_routes, user_routes};

use serde::Serialize;

use crate::types::{ApiResponse, Page, Paginated, PaginationParams};

/// Convert a service page into the paginated success envelope.
pub(crate) fn paginated<T, R>(
    page: Page<T>,
    params: &PaginationParams,
    message: &str,
) -> ApiResponse<Vec<R>>
where
    R: From<T> + Serialize,
{
    ApiResponse::page(Paginated::from_page(page.map(R::from), params), message)
}
