use thiserror::Error;

use super::claims::TokenScope;

/// Failures signing or checking access and refresh tokens.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token rejected: {0}")]
    InvalidToken(String),

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Token scope mismatch: expected {expected:?}")]
    WrongScope { expected: TokenScope },
}
