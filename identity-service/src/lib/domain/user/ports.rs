use async_trait::async_trait;

use crate::domain::errors::IdentityError;
use crate::domain::session::models::AccessToken;
use crate::domain::session::models::TokenPair;
use crate::domain::user::models::KeyType;
use crate::domain::user::models::Kind;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new account with a generated id and username.
    ///
    /// # Errors
    /// * `InvalidInput` - Email malformed or password too short
    /// * `Conflict` - Email or username already taken within `kind`
    /// * `Internal` - Hashing or storage failure
    async fn register(&self, kind: Kind, email: &str, password: &str)
        -> Result<User, IdentityError>;

    /// Authenticate with username or email and password.
    ///
    /// # Errors
    /// * `AuthFailed` - Unknown account or wrong password, indistinguishably
    /// * `Internal` - Storage failure or malformed stored hash
    async fn password_login(
        &self,
        kind: Kind,
        username_or_email: &str,
        password: &str,
    ) -> Result<User, IdentityError>;

    /// Mint an access/refresh pair. Invalidates any earlier refresh token.
    ///
    /// # Errors
    /// * `Internal` - Signing or session storage failure
    async fn issue_tokens(&self, user: &User) -> Result<TokenPair, IdentityError>;

    /// Resolve the user bound to an access token.
    ///
    /// # Errors
    /// * `AuthFailed` - Token malformed, expired, wrong scope or user gone
    /// * `Internal` - Storage failure
    async fn verify_token(&self, access_token: &str) -> Result<User, IdentityError>;

    /// Mint a new access token from the active refresh token.
    ///
    /// # Errors
    /// * `AuthFailed` - Token invalid, expired or superseded
    /// * `Internal` - Signing or storage failure
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<AccessToken, IdentityError>;

    /// Drop the active refresh session of a user.
    async fn revoke_tokens(&self, kind: Kind, user_id: &UserId) -> Result<(), IdentityError>;

    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, kind: Kind, id: &UserId) -> Result<User, IdentityError>;

    async fn list_users(&self, kind: Kind) -> Result<Vec<User>, IdentityError>;

    /// Merge a partial profile into the stored user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Conflict` - New email already taken
    async fn update_profile(
        &self,
        kind: Kind,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, IdentityError>;

    /// Replace the password and revoke the refresh session.
    ///
    /// # Errors
    /// * `InvalidInput` - Password too short
    /// * `NotFound` - User does not exist
    async fn reset_password(
        &self,
        kind: Kind,
        id: &UserId,
        new_password: &str,
    ) -> Result<User, IdentityError>;

    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete_user(&self, kind: Kind, id: &UserId) -> Result<(), IdentityError>;
}

/// Persistence operations for user accounts.
///
/// Implementations must make `put(_, true)` atomic with respect to concurrent
/// creates racing on the same email or username within a kind. Lookups are
/// case-sensitive on id and username, case-insensitive on email.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// # Errors
    /// * `NotFound` - No user matches
    /// * `Internal` - Storage failure
    async fn get(&self, kind: Kind, key: &str, key_type: KeyType) -> Result<User, IdentityError>;

    /// Create or replace a user.
    ///
    /// # Errors
    /// * `Conflict` - `only_create` and the id, email or username is taken
    /// * `Internal` - Storage failure
    async fn put(&self, user: User, only_create: bool) -> Result<(), IdentityError>;

    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete(&self, kind: Kind, id: &UserId) -> Result<(), IdentityError>;

    async fn list(&self, kind: Kind) -> Result<Vec<User>, IdentityError>;
}
