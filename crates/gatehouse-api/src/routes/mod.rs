//! API routes

mod auth;
mod health;
pub mod metrics;
pub mod types;
mod users;
mod validation;

use axum::Router;
use std::sync::Arc;

use gatehouse_auth::access_gate;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Fallback for unmatched routes
async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Fallback for a known path requested with an unsupported method
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Create the main router.
///
/// The access gate wraps every route, including the fallbacks, so protected
/// prefixes are enforced even for paths or methods with no handler.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let gate = state.gate.clone();

    let mut router = Router::new()
        // Health checks
        .merge(health::routes())
        // Registration and login
        .merge(auth::routes())
        // User management
        .merge(users::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    // Registered last so it reaches every merged method router
    router
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(gate, access_gate))
}
