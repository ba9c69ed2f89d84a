use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::IdentityError;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::KeyType;
use crate::domain::user::models::Kind;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserStore;

/// Process-local user store.
///
/// Every write runs under one write lock, so uniqueness checks and the
/// insert that follows are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<(Kind, UserId), User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn uniqueness_violation(existing: &User, candidate: &User) -> Option<String> {
    if existing.kind != candidate.kind || existing.id == candidate.id {
        return None;
    }
    if existing.email.normalized() == candidate.email.normalized() {
        return Some(format!("email '{}' is already registered", candidate.email));
    }
    if existing.username == candidate.username {
        return Some(format!("username '{}' is already taken", candidate.username));
    }
    None
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, kind: Kind, key: &str, key_type: KeyType) -> Result<User, IdentityError> {
        let users = self.users.read().await;

        let found = match key_type {
            KeyType::Id => users
                .iter()
                .find(|((k, id), _)| *k == kind && id.as_str() == key)
                .map(|(_, user)| user),
            KeyType::Email => {
                let key = key.to_lowercase();
                users
                    .values()
                    .find(|user| user.kind == kind && user.email.normalized() == key)
            }
            KeyType::Username => users
                .values()
                .find(|user| user.kind == kind && user.username.as_str() == key),
        };

        found
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(format!("user '{}'", key)))
    }

    async fn put(&self, user: User, only_create: bool) -> Result<(), IdentityError> {
        let mut users = self.users.write().await;
        let key = (user.kind, user.id.clone());

        if only_create && users.contains_key(&key) {
            return Err(IdentityError::Conflict(format!(
                "user id '{}' already exists",
                user.id
            )));
        }
        if let Some(message) = users
            .values()
            .find_map(|existing| uniqueness_violation(existing, &user))
        {
            return Err(IdentityError::Conflict(message));
        }

        users.insert(key, user);
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &UserId) -> Result<(), IdentityError> {
        self.users
            .write()
            .await
            .remove(&(kind, id.clone()))
            .map(|_| ())
            .ok_or_else(|| IdentityError::NotFound(format!("user '{}'", id)))
    }

    async fn list(&self, kind: Kind) -> Result<Vec<User>, IdentityError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.kind == kind)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }
}

/// Process-local refresh session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<(Kind, UserId), RefreshSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: RefreshSession) -> Result<(), IdentityError> {
        self.sessions
            .write()
            .await
            .insert((session.kind, session.user_id.clone()), session);
        Ok(())
    }

    async fn get(
        &self,
        kind: Kind,
        user_id: &UserId,
    ) -> Result<Option<RefreshSession>, IdentityError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&(kind, user_id.clone()))
            .cloned())
    }

    async fn delete(&self, kind: Kind, user_id: &UserId) -> Result<(), IdentityError> {
        self.sessions.write().await.remove(&(kind, user_id.clone()));
        Ok(())
    }
}
