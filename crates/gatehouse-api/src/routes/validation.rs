//! Input validation for user-supplied fields

use crate::error::ApiError;

/// Maximum allowed display name length
const MAX_NAME_LENGTH: usize = 128;
/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed password length (hashing cost grows with input size)
pub const MAX_PASSWORD_LENGTH: usize = 256;

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Emails are matched byte-for-byte, so whitespace anywhere is rejected
/// rather than silently stripped.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ApiError::BadRequest("Email address is not valid".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::BadRequest("Email address is not valid".to_string())),
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email(" alice@example.com").is_err());
        assert!(validate_email("alice@example.com\n").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"p".repeat(257)).is_err());
    }
}
