//! Password hashing

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;

/// Default work factor (Argon2 time cost)
pub const DEFAULT_WORK_FACTOR: u32 = 10;

/// Default Argon2 memory cost in KiB (19 MiB)
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;

/// Salted Argon2id hasher with a fixed work factor.
///
/// Hashes are PHC strings that embed their own salt and parameters, so a
/// hash produced under one work factor still verifies after the factor is
/// changed.
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
    /// Hash of a random secret, verified when there is no real hash to check
    dummy_hash: Arc<str>,
}

impl SecretHasher {
    /// Create a hasher. `work_factor` must be positive.
    pub fn new(work_factor: u32, memory_kib: u32) -> Result<Self, AuthError> {
        if work_factor == 0 {
            return Err(AuthError::InvalidConfig(
                "work factor must be a positive integer".to_string(),
            ));
        }

        let params = Params::new(memory_kib, work_factor, 1, None)
            .map_err(|e| AuthError::InvalidConfig(format!("invalid hash parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let dummy_secret = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(dummy_secret.as_str().as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a secret with a fresh random salt
    pub fn hash_secret(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Check a secret against a stored hash.
    ///
    /// Malformed hashes verify as `false`. The final comparison is constant
    /// time.
    pub fn verify_secret(&self, secret: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Stored hash is not a valid PHC string: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    /// A valid hash that no caller-supplied secret is expected to match
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}
