//! Application state

use gatehouse_auth::{AccessGate, CredentialService};
use gatehouse_db::Database;
use std::sync::Arc;

/// Prometheus handle used to render the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub credentials: CredentialService,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(db: Database, credentials: CredentialService, gate: Arc<AccessGate>) -> Self {
        Self {
            db,
            credentials,
            gate,
        }
    }
}
