use thiserror::Error;

/// Failure talking to a provider's token endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Token request failed: {0}")]
    Transport(String),

    #[error("Provider rejected code exchange with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}
