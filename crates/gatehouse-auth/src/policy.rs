//! Path-based access policy

use serde::{Deserialize, Serialize};

/// Which request paths need a token, and which of those need an admin.
///
/// Entries are plain prefixes: `/api/users` covers `/api/users/42` and also
/// `/api/users-export`. Admin prefixes are always protected as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub protected_prefixes: Vec<String>,
    #[serde(default)]
    pub admin_prefixes: Vec<String>,
}

impl AccessPolicy {
    pub fn new(protected_prefixes: Vec<String>, admin_prefixes: Vec<String>) -> Self {
        Self {
            protected_prefixes,
            admin_prefixes,
        }
    }

    /// Whether the path requires a valid token
    pub fn is_protected(&self, path: &str) -> bool {
        matches_any(&self.protected_prefixes, path) || self.is_admin(path)
    }

    /// Whether the path requires the admin role
    pub fn is_admin(&self, path: &str) -> bool {
        matches_any(&self.admin_prefixes, path)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            protected_prefixes: vec![
                "/api/products/manage".to_string(),
                "/api/orders".to_string(),
                "/api/users".to_string(),
            ],
            admin_prefixes: vec!["/api/users".to_string(), "/api/products/manage".to_string()],
        }
    }
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
