/// Credentials and sessions
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 session tokens with a 72 hour lifetime
/// - [`service`]: registration and login on top of the user store
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::auth::password::{hash_password, verify_password};
/// use tasktrack_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(1), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod service;
