//! API handlers for the devsearch service.

pub mod auth;
pub mod health;
pub mod root;
