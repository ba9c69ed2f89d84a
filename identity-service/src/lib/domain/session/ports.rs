use async_trait::async_trait;

use crate::domain::errors::IdentityError;
use crate::domain::session::models::RefreshSession;
use crate::domain::user::models::Kind;
use crate::domain::user::models::UserId;

/// Persistence for the active refresh session of each user, keyed by
/// `(kind, user_id)` like the accounts themselves.
///
/// `put` replaces whatever session the user had, which is what invalidates
/// earlier refresh tokens. Two racing `put` calls for one user are a benign
/// lost update: the loser's refresh token simply stops working.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn put(&self, session: RefreshSession) -> Result<(), IdentityError>;

    async fn get(
        &self,
        kind: Kind,
        user_id: &UserId,
    ) -> Result<Option<RefreshSession>, IdentityError>;

    /// Removing a missing session is not an error.
    async fn delete(&self, kind: Kind, user_id: &UserId) -> Result<(), IdentityError>;
}
