//! Health check endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

use super::types::{DatabaseHealthResponse, DatabaseStats};

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check handler
async fn health() -> Json<HealthResponse> {
    metrics::counter!("gatehouse_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/db - confirm the user store answers queries
async fn database_health(State(state): State<AppState>) -> Response {
    match state.db.count_users().await {
        Ok(user_count) => Json(DatabaseHealthResponse {
            success: true,
            message: "Database connection successful".to_string(),
            stats: DatabaseStats { user_count },
        })
        .into_response(),
        Err(e) => {
            error!("Database connection error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to connect to database"
                })),
            )
                .into_response()
        }
    }
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/health/db", get(database_health))
}
