//! Gatehouse Authentication and Authorization
//!
//! This crate provides password hashing, JWT issuance and verification,
//! credential checks against the user store, and the path-based access
//! gate that sits in front of the API.

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use credentials::{AuthSession, CredentialService, UserProfile};
pub use error::AuthError;
pub use jwt::{Claims, DEVELOPMENT_JWT_SECRET, Identity, TOKEN_LIFETIME_SECS, TokenManager, TokenVerification};
pub use middleware::{AccessGate, GateDecision, access_gate, extract_bearer_token};
pub use password::{DEFAULT_MEMORY_KIB, DEFAULT_WORK_FACTOR, SecretHasher};
pub use policy::AccessPolicy;
