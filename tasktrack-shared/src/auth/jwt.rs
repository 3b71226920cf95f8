/// Session tokens
///
/// Tokens are HS256-signed JWTs carrying the user id and a fixed 72 hour
/// lifetime. The signing secret is passed in by the caller; this module never
/// reads the environment.
///
/// # Claims
///
/// - `user_id`: authenticated user
/// - `iat`: issued at (Unix timestamp)
/// - `exp`: `iat` + 72h
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let token = create_token(&Claims::new(42), "a-long-random-signing-secret")?;
///
/// let claims = validate_token(&token, "a-long-random-signing-secret")?;
/// assert_eq!(claims.user_id, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime in hours
pub const TOKEN_LIFETIME_HOURS: i64 = 72;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims issued now
    pub fn new(user_id: i64) -> Self {
        Self::issued_at(user_id, Utc::now())
    }

    /// Claims issued at a given instant
    pub fn issued_at(user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        }
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies the signature and expiry of a token and returns its claims
///
/// # Errors
///
/// Returns `JwtError::Expired` for an expired token and
/// `JwtError::ValidationError` for anything else (bad signature, malformed
/// token, wrong algorithm).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_lifetime_is_72_hours() {
        let claims = Claims::new(1);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_create_and_validate() {
        let claims = Claims::new(7);
        let token = create_token(&claims, SECRET).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(validate_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = create_token(&Claims::new(7), SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret"),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired_token_fails() {
        let claims = Claims::issued_at(7, Utc::now() - Duration::hours(73));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_malformed_token_fails() {
        assert!(validate_token("not.a.token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }
}
