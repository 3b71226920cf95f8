/// Error taxonomy for the core services
///
/// Every service operation returns [`ServiceResult`]. The variants map onto
/// client-facing categories and never carry raw credentials:
///
/// - `Validation`: malformed or duplicate input (client fault)
/// - `Auth`: bad credentials, deliberately undifferentiated
/// - `NotFound`: missing or owned by someone else, deliberately undifferentiated
/// - `Config`: missing signing key or hashing failure (server fault)
/// - `Store`: the backing store failed; fatal to the request
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Core service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    Auth,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

/// Constraint violations surface as validation failures, anything else is a
/// store fault
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::Constraint(msg) => ServiceError::Validation(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
