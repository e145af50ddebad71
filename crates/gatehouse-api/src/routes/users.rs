//! User management routes
//!
//! Access to these routes is decided by the access gate; with the default
//! policy every path here requires an admin token.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::{CreateUserRequest, UserResponse};
use super::validation::{validate_email, validate_name, validate_password};

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    if let Some(password) = &request.password {
        validate_password(password)?;
    }

    debug!("Creating user: {}", request.email);

    let user = state
        .credentials
        .create_account(
            &request.name,
            &request.email,
            request.password.as_deref(),
            request.role.unwrap_or_default(),
        )
        .await?;

    info!("Created user: {}", user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .credentials
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user))
}
