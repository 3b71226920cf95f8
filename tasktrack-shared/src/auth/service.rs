/// Registration and login
///
/// [`AuthService`] is the only place that sees plaintext passwords. They are
/// hashed before reaching the store and never logged; log lines carry the
/// user id or email at most.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::auth::service::{AuthConfig, AuthService};
/// use tasktrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), tasktrack_shared::error::ServiceError> {
/// let auth = AuthService::new(
///     Arc::new(MemoryStore::new()),
///     AuthConfig::with_secret("a-long-random-signing-secret"),
/// );
///
/// auth.register("ada", "ada@example.com", "analytical-engine").await?;
/// let session = auth.login("ada@example.com", "analytical-engine").await?;
/// assert_eq!(session.user.username, "ada");
/// # Ok(())
/// # }
/// ```
use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use super::jwt::{create_token, Claims};
use super::password::{hash_password, verify_password_or_dummy};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{NewUser, User};
use crate::store::SharedStore;

/// Token signing configuration, loaded once at startup
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// HS256 signing secret; `None` disables token issuance
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Issues credentials and session tokens
#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: SharedStore, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Creates a user with a hashed password
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is blank or the email/username is taken
    /// - `Config` if hashing fails
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ServiceError::validation(
                "Username, email and password are required",
            ));
        }

        let password = password.to_owned();
        let password_hash = run_blocking(move || hash_password(&password)).await??;
        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a 72 hour session token
    ///
    /// # Errors
    ///
    /// - `Auth` for an unknown email or wrong password, indistinguishably
    /// - `Config` if no signing secret is configured
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let user = self.store.find_user_by_email(email.trim()).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password = password.to_owned();
        let verified =
            run_blocking(move || verify_password_or_dummy(&password, stored_hash.as_deref()))
                .await?;

        let user = match (user, verified) {
            (Some(user), Ok(true)) => user,
            (None, _) => {
                info!("Login failed: unknown email");
                return Err(ServiceError::Auth);
            }
            (Some(user), Ok(false)) => {
                info!(user_id = user.id, "Login failed: wrong password");
                return Err(ServiceError::Auth);
            }
            (Some(user), Err(e)) => {
                error!(user_id = user.id, error = %e, "Stored password hash is unusable");
                return Err(ServiceError::Auth);
            }
        };

        let secret = self
            .config
            .jwt_secret
            .as_deref()
            .ok_or_else(|| ServiceError::Config("JWT secret is not configured".to_string()))?;
        let token = create_token(&Claims::new(user.id), secret)?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome { token, user })
    }
}

/// Runs Argon2 work on the blocking pool so request workers keep serving
async fn run_blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Config(format!("Password hashing task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::auth::jwt::{validate_token, TOKEN_LIFETIME_HOURS};
    use crate::auth::password::verify_password;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service(secret: Option<&str>) -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            AuthConfig {
                jwt_secret: secret.map(str::to_string),
            },
        )
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let auth = service(Some(SECRET));
        let user = auth.register("ada", "ada@example.com", "s3cret-pass").await.unwrap();

        assert_ne!(user.password_hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &user.password_hash).unwrap());
        assert!(!verify_password("other-pass", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let auth = service(Some(SECRET));
        let result = auth.register("  ", "ada@example.com", "pw").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_validation_error() {
        let auth = service(Some(SECRET));
        auth.register("ada", "ada@example.com", "pw").await.unwrap();

        let result = auth.register("ada2", "ada@example.com", "pw").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_token_expires_after_72_hours() {
        let auth = service(Some(SECRET));
        let user = auth.register("ada", "ada@example.com", "pw").await.unwrap();

        let outcome = auth.login("ada@example.com", "pw").await.unwrap();
        let claims = validate_token(&outcome.token, SECRET).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 3600);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service(Some(SECRET));
        auth.register("ada", "ada@example.com", "pw").await.unwrap();

        let wrong_password = auth.login("ada@example.com", "nope").await.unwrap_err();
        let unknown_email = auth.login("eve@example.com", "pw").await.unwrap_err();

        assert!(matches!(wrong_password, ServiceError::Auth));
        assert!(matches!(unknown_email, ServiceError::Auth));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_hashing_does_not_stall_other_tasks() {
        let auth = service(Some(SECRET));

        let running = Arc::new(AtomicBool::new(true));
        let ticker = tokio::spawn({
            let running = running.clone();
            async move {
                let mut worst = Duration::ZERO;
                let mut last = Instant::now();
                while running.load(Ordering::Relaxed) {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    let now = Instant::now();
                    worst = worst.max(now - last);
                    last = now;
                }
                worst
            }
        });
        tokio::task::yield_now().await;

        let started = Instant::now();
        auth.register("ada", "ada@example.com", "pw").await.unwrap();
        auth.login("ada@example.com", "pw").await.unwrap();
        let elapsed = started.elapsed();

        running.store(false, Ordering::Relaxed);
        let worst_gap = ticker.await.unwrap();

        assert!(
            worst_gap < elapsed / 2,
            "ticker stalled for {:?} during {:?} of hashing",
            worst_gap,
            elapsed
        );
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_full_verification() {
        let auth = service(Some(SECRET));
        auth.register("ada", "ada@example.com", "pw").await.unwrap();

        let started = Instant::now();
        auth.login("ada@example.com", "nope").await.unwrap_err();
        let wrong_password = started.elapsed();

        let started = Instant::now();
        auth.login("eve@example.com", "nope").await.unwrap_err();
        let unknown_email = started.elapsed();

        assert!(
            unknown_email > wrong_password / 4,
            "unknown email took {:?}, wrong password took {:?}",
            unknown_email,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_login_without_secret_is_config_error() {
        let auth = service(None);
        auth.register("ada", "ada@example.com", "pw").await.unwrap();

        let result = auth.login("ada@example.com", "pw").await;
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", AuthConfig::with_secret("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
