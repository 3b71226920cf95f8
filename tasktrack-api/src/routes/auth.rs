/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Exchange credentials for a 72 hour token

use std::fmt;

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tasktrack_shared::{auth::service::LoginOutcome, models::user::User};
use validator::Validate;

/// Register request
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login request
///
/// Only presence is checked here so every bad login gets the same 401.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
///
/// { "username": "ada", "email": "ada@example.com", "password": "analytical-engine" }
/// ```
///
/// Responds `201 Created` with the user (no password hash).
///
/// # Errors
///
/// - `422 Unprocessable Entity`: body validation failed
/// - `400 Bad Request`: email or username already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login
///
/// ```text
/// POST /api/auth/login
///
/// { "email": "ada@example.com", "password": "analytical-engine" }
/// ```
///
/// Responds with `{"token": "eyJ...", "user": {...}}`.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (same body for both)
/// - `500 Internal Server Error`: no signing secret configured
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    req.validate()?;

    let outcome = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "long-enough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let req = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "hunter2-hunter2".to_string(),
        };
        assert!(!format!("{:?}", req).contains("hunter2"));
    }
}
