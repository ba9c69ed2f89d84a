use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::Kind;
use crate::domain::user::models::UserId;

pub const TOKEN_TYPE: &str = "Bearer";

/// Access/refresh pair returned on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Access token minted from a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Server-side record of the one refresh token a user may currently use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub user_id: UserId,
    pub kind: Kind,
    /// `jti` of the active refresh token
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
