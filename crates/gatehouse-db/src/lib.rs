//! Gatehouse Database Layer
//!
//! User persistence for Gatehouse, backed by SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
