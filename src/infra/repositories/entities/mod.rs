//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod appointment;
pub mod health_record;
pub mod notification;
pub mod pet;
pub mod subscription_plan;
pub mod user;
pub mod user_profile;
pub mod user_subscription;
pub mod vaccination;
