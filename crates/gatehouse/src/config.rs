//! Configuration loading

use anyhow::{Context, Result};
use gatehouse_auth::{AccessPolicy, DEFAULT_MEMORY_KIB, DEFAULT_WORK_FACTOR};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Main configuration structure
///
/// Sources, lowest precedence first: built-in defaults, the TOML file,
/// `GATEHOUSE__SECTION__KEY` environment variables, then CLI arguments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub access: AccessPolicy,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file, created if missing
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./data/gatehouse.db".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Required in production.
    pub jwt_secret: Option<String>,
    /// Argon2 time cost
    pub work_factor: u32,
    /// Argon2 memory cost in KiB
    pub memory_kib: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            work_factor: DEFAULT_WORK_FACTOR,
            memory_kib: DEFAULT_MEMORY_KIB,
        }
    }
}

impl AuthConfig {
    /// The configured signing secret; an empty value counts as unset
    pub fn signing_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|s| !s.is_empty())
    }
}

/// First-run admin account, created only while the store has no users
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_name: "Administrator".to_string(),
            admin_email: None,
            admin_password: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus the environment
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);
        if config_path.exists() {
            info!("Loading configuration from {}", path);
        } else {
            info!("Config file not found at {}, using defaults", path);
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))
    }

    /// Reject settings the services cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.auth.work_factor == 0 {
            anyhow::bail!("auth.work_factor must be a positive integer");
        }

        let has_empty_prefix = self
            .access
            .protected_prefixes
            .iter()
            .chain(&self.access.admin_prefixes)
            .any(|p| p.is_empty());
        if has_empty_prefix {
            warn!("An empty access prefix matches every path");
        }

        Ok(())
    }
}
