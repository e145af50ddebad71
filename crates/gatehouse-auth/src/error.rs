//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    MissingAuthHeader,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Admin access required")]
    Forbidden,

    #[error("User with this email already exists")]
    DuplicateUser,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Status code and client-facing message. Internal failures share one
    /// generic message so nothing about them reaches the client.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::DuplicateUser => {
                (StatusCode::BAD_REQUEST, "User with this email already exists")
            }
            AuthError::PasswordHash(_)
            | AuthError::InvalidConfig(_)
            | AuthError::Jwt(_)
            | AuthError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Authentication failure: {}", self);
        }

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
