//! JWT token management

use chrono::{DateTime, Duration, Utc};
use gatehouse_db::{User, UserRole};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Tokens expire exactly seven days after issuance
pub const TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

/// Signing key used when no secret is configured. Never use in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development_jwt_secret";

/// The facts a token is minted from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: String,
    pub email: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Outcome of checking a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerification {
    Valid(Claims),
    Invalid,
}

impl TokenVerification {
    pub fn into_claims(self) -> Option<Claims> {
        match self {
            TokenVerification::Valid(claims) => Some(claims),
            TokenVerification::Invalid => None,
        }
    }
}

/// Why a token was refused. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenRejection {
    Malformed,
    BadSignature,
    Expired,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    /// Create a new token manager signing with HS256 under `secret`
    pub fn new(secret: &str) -> Self {
        // Expiry is checked against an explicit clock in `decode_claims`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Token lifetime in seconds
    pub fn lifetime_secs(&self) -> i64 {
        TOKEN_LIFETIME_SECS
    }

    /// Issue a token for an identity
    pub fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_token_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now + Duration::seconds(TOKEN_LIFETIME_SECS);

        let claims = Claims {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Issuing token for user: {}", identity.id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token's signature and expiry
    pub fn verify_token(&self, token: &str) -> TokenVerification {
        self.verify_token_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> TokenVerification {
        match self.decode_claims(token, now) {
            Ok(claims) => TokenVerification::Valid(claims),
            Err(reason) => {
                debug!("Rejected bearer token: {:?}", reason);
                TokenVerification::Invalid
            }
        }
    }

    fn decode_claims(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenRejection> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenRejection::BadSignature
                    }
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    _ => TokenRejection::Malformed,
                }
            })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(TokenRejection::Expired);
        }

        Ok(token_data.claims)
    }
}
