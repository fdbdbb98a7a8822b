//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod admin;
pub mod maintenance;
pub mod migrate;
pub mod serve;
