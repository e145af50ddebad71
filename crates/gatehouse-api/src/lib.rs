//! Gatehouse REST API
//!
//! This crate provides the Axum-based HTTP API for Gatehouse: registration
//! and login, user management, and health endpoints, all behind the access
//! gate.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
