//! Request/Response DTOs

use gatehouse_auth::UserProfile;
use gatehouse_db::{User, UserRole};
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
    pub expires_in: i64,
}

// ==================== User Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Health Types ====================

/// Database connectivity check response
#[derive(Serialize)]
pub struct DatabaseHealthResponse {
    pub success: bool,
    pub message: String,
    pub stats: DatabaseStats,
}

#[derive(Serialize)]
pub struct DatabaseStats {
    pub user_count: i64,
}
