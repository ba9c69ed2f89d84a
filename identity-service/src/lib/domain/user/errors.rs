use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("User ID must not be empty")]
    Empty,

    #[error("User ID contains invalid characters (only ASCII alphanumeric and underscore allowed)")]
    InvalidCharacters,
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains invalid characters (only ASCII alphanumeric and underscore allowed)")]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email must be present")]
    Missing,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for account kind parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KindError {
    #[error("Unknown user kind '{0}', expected 'user' or 'admin'")]
    Unknown(String),
}
