//! Access gate middleware for Axum

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{TokenManager, TokenVerification};
use crate::policy::AccessPolicy;

/// What the gate decided for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward unchanged
    Allow,
    /// Protected path without a usable bearer token
    MissingToken,
    /// Bearer token present but not valid
    InvalidToken,
    /// Valid token without the admin role on an admin path
    Forbidden,
}

impl GateDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::MissingToken => "missing_token",
            GateDecision::InvalidToken => "invalid_token",
            GateDecision::Forbidden => "forbidden",
        }
    }

    /// The rejection to send, or `None` when the request may proceed
    pub fn rejection(&self) -> Option<AuthError> {
        match self {
            GateDecision::Allow => None,
            GateDecision::MissingToken => Some(AuthError::MissingAuthHeader),
            GateDecision::InvalidToken => Some(AuthError::TokenInvalid),
            GateDecision::Forbidden => Some(AuthError::Forbidden),
        }
    }
}

/// Request gate combining the access policy with token verification
pub struct AccessGate {
    policy: AccessPolicy,
    tokens: Arc<TokenManager>,
}

impl AccessGate {
    pub fn new(policy: AccessPolicy, tokens: Arc<TokenManager>) -> Self {
        Self { policy, tokens }
    }

    /// Decide a request from its path and raw `Authorization` header value
    pub fn evaluate(&self, path: &str, authorization: Option<&str>) -> GateDecision {
        if !self.policy.is_protected(path) {
            return GateDecision::Allow;
        }

        let Some(token) = authorization.and_then(extract_bearer_token) else {
            return GateDecision::MissingToken;
        };

        let claims = match self.tokens.verify_token(token) {
            TokenVerification::Valid(claims) => claims,
            TokenVerification::Invalid => return GateDecision::InvalidToken,
        };

        if self.policy.is_admin(path) && !claims.role.is_admin() {
            debug!("User {} lacks admin role for {}", claims.id, path);
            return GateDecision::Forbidden;
        }

        GateDecision::Allow
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The token is the second space-separated segment, whatever the scheme
/// word; an empty one counts as absent. A wrong scheme therefore reaches
/// verification and fails there.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header.split(' ').nth(1).filter(|token| !token.is_empty())
}

/// Access gate middleware
///
/// Rejects requests to protected paths that lack a valid token, and requests
/// to admin paths whose token is not an admin's. Allowed requests pass
/// through untouched.
pub async fn access_gate(
    State(gate): State<Arc<AccessGate>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let decision = gate.evaluate(request.uri().path(), authorization);
    metrics::counter!("gatehouse_gate_decisions_total", "outcome" => decision.as_str())
        .increment(1);

    match decision.rejection() {
        None => next.run(request).await,
        Some(rejection) => {
            debug!(
                "Gate rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                decision.as_str()
            );
            rejection.into_response()
        }
    }
}
