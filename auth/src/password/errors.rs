use thiserror::Error;

/// Failures hashing or checking account passwords.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid hasher configuration: {0}")]
    InvalidConfiguration(String),
}
