//! Prometheus scrape endpoint

use axum::{Router, extract::State, http::header, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// Text exposition format version understood by Prometheus scrapers
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Routes serving the recorder behind `handle`
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(handle)
}

/// GET /metrics - gate, login and registration counters
async fn scrape(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        handle.render(),
    )
}
