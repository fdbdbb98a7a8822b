//! Infrastructure layer - database, cache and repositories.

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStatus};
pub use db::Database;
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};
