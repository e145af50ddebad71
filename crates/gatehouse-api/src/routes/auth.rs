//! Registration and login routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use gatehouse_auth::{AuthError, UserProfile};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, RegisterRequest};
use super::validation::{MAX_PASSWORD_LENGTH, validate_email, validate_name, validate_password};

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    debug!("Registration attempt for: {}", request.email);

    let result = state
        .credentials
        .register(&request.name, &request.email, &request.password)
        .await;

    let user = match result {
        Ok(user) => user,
        Err(AuthError::DuplicateUser) => {
            metrics::counter!("gatehouse_registrations_total", "result" => "duplicate")
                .increment(1);
            return Err(AuthError::DuplicateUser.into());
        }
        Err(e) => {
            metrics::counter!("gatehouse_registrations_total", "result" => "error").increment(1);
            return Err(ApiError::internal("Failed to register user", e));
        }
    };

    metrics::counter!("gatehouse_registrations_total", "result" => "created").increment(1);
    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Bound the input before spending hash time on it
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    debug!("Login attempt for: {}", request.email);

    let session = state
        .credentials
        .authenticate(&request.email, &request.password)
        .await?;

    let Some(session) = session else {
        metrics::counter!("gatehouse_login_attempts_total", "result" => "rejected").increment(1);
        return Err(AuthError::InvalidCredentials.into());
    };

    metrics::counter!("gatehouse_login_attempts_total", "result" => "accepted").increment(1);

    Ok(Json(LoginResponse {
        user: session.user,
        token: session.token,
        expires_in: state.credentials.tokens().lifetime_secs(),
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}
