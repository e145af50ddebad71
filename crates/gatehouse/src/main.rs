//! Gatehouse - user registration and token-gated API server

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{BootstrapConfig, Config, LoggingConfig};
use gatehouse_api::{AppState, create_router};
use gatehouse_auth::{
    AccessGate, CredentialService, DEVELOPMENT_JWT_SECRET, SecretHasher, TokenManager,
};
use gatehouse_db::{Database, UserRole};

/// Gatehouse - user registration and token-gated API server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "GATEHOUSE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "GATEHOUSE_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Password hash work factor
    #[arg(long, env = "SALT_ROUNDS", value_parser = clap::value_parser!(u32).range(1..))]
    salt_rounds: Option<u32>,
}

impl Args {
    /// Fold CLI/env overrides into the loaded configuration
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt_secret = Some(secret);
        }
        if let Some(rounds) = self.salt_rounds {
            config.auth.work_factor = rounds;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database.url()).await?;

    // Initialize credential services
    let hasher = SecretHasher::new(config.auth.work_factor, config.auth.memory_kib)?;
    let secret = match config.auth.signing_secret() {
        Some(secret) => secret,
        None => {
            warn!("No JWT secret configured, falling back to the insecure development secret");
            DEVELOPMENT_JWT_SECRET
        }
    };
    let tokens = Arc::new(TokenManager::new(secret));
    let credentials = CredentialService::new(db.clone(), hasher, tokens.clone());

    bootstrap_admin(&db, &credentials, &config.bootstrap).await?;

    // Access gate over the configured policy
    info!(
        "Access policy: {} protected prefixes, {} admin prefixes",
        config.access.protected_prefixes.len(),
        config.access.admin_prefixes.len()
    );
    let gate = Arc::new(AccessGate::new(config.access.clone(), tokens));

    // Create application state and router
    let state = AppState::new(db.clone(), credentials, gate);
    let app = create_router(state, Some(Arc::new(metrics_handle))).layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Create the configured admin account if the store is empty
async fn bootstrap_admin(
    db: &Database,
    credentials: &CredentialService,
    bootstrap: &BootstrapConfig,
) -> Result<()> {
    let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
        return Ok(());
    };

    if db.count_users().await? > 0 {
        return Ok(());
    }

    info!("Creating bootstrap admin user");
    let admin = credentials
        .create_account(&bootstrap.admin_name, email, Some(password.as_str()), UserRole::Admin)
        .await?;
    info!("Bootstrap admin created (id: {})", admin.id);
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until the process is killed
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
