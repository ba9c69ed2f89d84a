use thiserror::Error;

use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::KindError;
use crate::domain::user::errors::UserIdError;
use crate::domain::user::errors::UsernameError;

/// Closed error taxonomy for every identity operation.
///
/// `AuthFailed` carries no detail on purpose: callers must not be able to
/// tell an unknown account from a wrong password or a bad token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Malformed or missing input, caller's fault
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uniqueness violation on create
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential or token rejected
    #[error("Authentication failed")]
    AuthFailed,

    /// Hashing, storage or provider failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserIdError> for IdentityError {
    fn from(err: UserIdError) -> Self {
        IdentityError::InvalidInput(format!("Invalid user ID: {}", err))
    }
}

impl From<UsernameError> for IdentityError {
    fn from(err: UsernameError) -> Self {
        IdentityError::InvalidInput(format!("Invalid username: {}", err))
    }
}

impl From<EmailError> for IdentityError {
    fn from(err: EmailError) -> Self {
        IdentityError::InvalidInput(format!("Invalid email: {}", err))
    }
}

impl From<KindError> for IdentityError {
    fn from(err: KindError) -> Self {
        IdentityError::InvalidInput(err.to_string())
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        match err {
            auth::PasswordError::TooShort { .. } => IdentityError::InvalidInput(err.to_string()),
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}
