//! Credential checks against the user store

use gatehouse_db::{Database, DbError, NewUser, User, UserRole};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::jwt::{Identity, TokenManager};
use crate::password::SecretHasher;

/// User fields safe to hand back to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

/// Hashing, authentication and account creation over the user store
#[derive(Clone)]
pub struct CredentialService {
    db: Database,
    hasher: SecretHasher,
    tokens: Arc<TokenManager>,
}

impl CredentialService {
    pub fn new(db: Database, hasher: SecretHasher, tokens: Arc<TokenManager>) -> Self {
        Self { db, hasher, tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Check an email/secret pair and issue a token.
    ///
    /// `Ok(None)` covers both an unknown email and a wrong secret. Store
    /// failures are the only errors.
    pub async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let user = self.db.find_user_by_email(email).await?;

        // Verify against a dummy hash when there is nothing real to check,
        // so unknown accounts cost the same as wrong passwords
        let stored_hash = user.as_ref().and_then(|u| u.password_hash.clone());
        let has_credential = stored_hash.is_some();
        let hash = stored_hash.unwrap_or_else(|| self.hasher.dummy_hash().to_string());

        let valid = self.verify_offloaded(secret, hash).await?;

        let user = match user {
            Some(user) if valid && has_credential => user,
            _ => {
                debug!("Authentication failed for {}", email);
                return Ok(None);
            }
        };

        let token = self.tokens.issue_token(&Identity::from(&user))?;
        info!("User {} authenticated", user.id);

        Ok(Some(AuthSession {
            user: UserProfile::from(&user),
            token,
        }))
    }

    /// Self-service registration. New accounts always get the `USER` role.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        self.create_account(name, email, Some(password), UserRole::User)
            .await
    }

    /// Create an account with an explicit role. Without a password the
    /// account exists but can never authenticate.
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: Option<&str>,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let password_hash = match password {
            Some(password) => Some(self.hash_offloaded(password).await?),
            None => None,
        };

        let user = self
            .db
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent insert of the same email
                DbError::Duplicate(_) => AuthError::DuplicateUser,
                other => AuthError::Store(other),
            })?;

        info!("Created user {} ({})", user.id, user.role);
        Ok(user)
    }

    /// Look up a user by ID
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        Ok(self.db.find_user_by_id(id).await?)
    }

    async fn hash_offloaded(&self, secret: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_secret(&secret))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("hashing task failed: {}", e)))?
    }

    async fn verify_offloaded(&self, secret: &str, hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_secret(&secret, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("verification task failed: {}", e)))
    }
}
