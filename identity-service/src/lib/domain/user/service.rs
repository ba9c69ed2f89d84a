use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use auth::TokenScope;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::errors::IdentityError;
use crate::domain::ports::Clock;
use crate::domain::ports::RandomSource;
use crate::domain::session::models::AccessToken;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::models::TokenPair;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::KeyType;
use crate::domain::user::models::Kind;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::ProfileUpdate;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::IdentityServicePort;
use crate::domain::user::ports::UserStore;

const KIND_CLAIM: &str = "kind";
/// Issuance instant in microseconds, finer than the standard `iat`.
const ISSUED_AT_MICROS_CLAIM: &str = "iat_us";
const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Token lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::hours(24 * 30),
        }
    }
}

/// Domain service implementation for identity operations.
///
/// Stateless between calls: accounts live in the `UserStore`, the active
/// refresh token of each user in the `SessionStore`.
pub struct IdentityService<US, SS>
where
    US: UserStore,
    SS: SessionStore,
{
    users: Arc<US>,
    sessions: Arc<SS>,
    authenticator: Arc<Authenticator>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    policy: TokenPolicy,
    /// Checked against when the login key matches no account
    decoy_hash: OnceCell<String>,
}

impl<US, SS> IdentityService<US, SS>
where
    US: UserStore,
    SS: SessionStore,
{
    pub fn new(
        users: Arc<US>,
        sessions: Arc<SS>,
        authenticator: Arc<Authenticator>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
        policy: TokenPolicy,
    ) -> Self {
        let decoy_hash = OnceCell::new_with(authenticator.hash_password(DECOY_PASSWORD).ok());
        Self {
            users,
            sessions,
            authenticator,
            clock,
            random,
            policy,
            decoy_hash,
        }
    }

    // Argon2 is deliberately slow; keep it off the async worker threads.
    async fn hash_password(&self, password: &str) -> Result<String, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| IdentityError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(IdentityError::from)
    }

    async fn password_matches(&self, password: &str, hash: &str) -> Result<bool, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let hash = hash.to_string();
        let outcome =
            tokio::task::spawn_blocking(move || authenticator.verify_password(&password, &hash))
                .await
                .map_err(|e| {
                    IdentityError::Internal(format!("Password verification task failed: {}", e))
                })?;

        match outcome {
            Ok(()) => Ok(true),
            Err(AuthenticationError::InvalidCredentials) => Ok(false),
            Err(e) => Err(IdentityError::Internal(e.to_string())),
        }
    }

    fn sign(
        &self,
        user_id: &UserId,
        kind: Kind,
        scope: TokenScope,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, Claims), IdentityError> {
        let claims = Claims::for_subject(user_id, scope, now, ttl)
            .with_extra(KIND_CLAIM, kind.as_str())
            .with_extra(ISSUED_AT_MICROS_CLAIM, now.timestamp_micros());
        let token = self
            .authenticator
            .issue_token(claims.clone())
            .map_err(|e| IdentityError::Internal(format!("Token generation failed: {}", e)))?;
        Ok((token, claims))
    }

    fn decode(&self, token: &str, scope: TokenScope) -> Result<(UserId, Kind, Claims), IdentityError> {
        let claims = self
            .authenticator
            .validate_token(token, scope)
            .map_err(|e| {
                tracing::debug!(error = %e, scope = ?scope, "Token rejected");
                IdentityError::AuthFailed
            })?;

        let user_id = claims
            .sub
            .as_deref()
            .and_then(|sub| UserId::new(sub).ok())
            .ok_or(IdentityError::AuthFailed)?;
        let kind = claims
            .extra_str(KIND_CLAIM)
            .and_then(|kind| kind.parse::<Kind>().ok())
            .ok_or(IdentityError::AuthFailed)?;

        Ok((user_id, kind, claims))
    }

    async fn bound_user(&self, kind: Kind, user_id: &UserId) -> Result<User, IdentityError> {
        self.users
            .get(kind, user_id.as_str(), KeyType::Id)
            .await
            .map_err(|e| match e {
                IdentityError::NotFound(_) => IdentityError::AuthFailed,
                other => internal(other),
            })
    }

    /// Spend the same verification work a wrong password costs.
    async fn reject_unknown_account(&self, password: &str) -> Result<(), IdentityError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await?;
        self.password_matches(password, decoy).await?;
        Ok(())
    }
}

/// Wrap unexpected store errors, keeping an existing `Internal` as is.
fn internal(err: IdentityError) -> IdentityError {
    match err {
        IdentityError::Internal(_) => err,
        other => IdentityError::Internal(other.to_string()),
    }
}

/// Pass `NotFound` and `Conflict` through, wrap everything else.
fn passthrough(err: IdentityError) -> IdentityError {
    match err {
        IdentityError::NotFound(_) | IdentityError::Conflict(_) => err,
        other => internal(other),
    }
}

#[async_trait]
impl<US, SS> IdentityServicePort for IdentityService<US, SS>
where
    US: UserStore,
    SS: SessionStore,
{
    async fn register(
        &self,
        kind: Kind,
        email: &str,
        password: &str,
    ) -> Result<User, IdentityError> {
        let now = self.clock.now();

        let mut user =
            NewUser::new(kind, email.trim()).sanitize_for_create(now, self.random.as_ref())?;
        let password_hash = self.hash_password(password).await?;
        user.set_password_hash(password_hash, now);
        user.validate()?;

        self.users.put(user.clone(), true).await.map_err(|e| match e {
            IdentityError::Conflict(_) => e,
            other => internal(other),
        })?;

        tracing::info!(user_id = %user.id, kind = %kind, "User registered");
        Ok(user)
    }

    async fn password_login(
        &self,
        kind: Kind,
        username_or_email: &str,
        password: &str,
    ) -> Result<User, IdentityError> {
        let key = username_or_email.trim();
        let key_type = if EmailAddress::is_valid(key) {
            KeyType::Email
        } else {
            KeyType::Username
        };

        let user = match self.users.get(kind, key, key_type).await {
            Ok(user) => user,
            Err(IdentityError::NotFound(_)) => {
                self.reject_unknown_account(password).await?;
                tracing::info!(kind = %kind, "Password login failed");
                return Err(IdentityError::AuthFailed);
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed during login");
                return Err(internal(e));
            }
        };

        if !self.password_matches(password, &user.password_hash).await? {
            tracing::info!(kind = %kind, "Password login failed");
            return Err(IdentityError::AuthFailed);
        }

        tracing::info!(user_id = %user.id, kind = %kind, "Password login succeeded");
        Ok(user)
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenPair, IdentityError> {
        let now = self.clock.now();

        let (access_token, _) = self.sign(
            &user.id,
            user.kind,
            TokenScope::Access,
            now,
            self.policy.access_ttl,
        )?;
        let (refresh_token, refresh_claims) = self.sign(
            &user.id,
            user.kind,
            TokenScope::Refresh,
            now,
            self.policy.refresh_ttl,
        )?;
        let token_id = refresh_claims
            .jti
            .ok_or_else(|| IdentityError::Internal("Refresh token has no id".to_string()))?;

        self.sessions
            .put(RefreshSession {
                user_id: user.id.clone(),
                kind: user.kind,
                token_id,
                issued_at: now,
                expires_at: now + self.policy.refresh_ttl,
            })
            .await
            .map_err(internal)?;

        tracing::debug!(user_id = %user.id, "Tokens issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.policy.access_ttl.num_seconds(),
        })
    }

    async fn verify_token(&self, access_token: &str) -> Result<User, IdentityError> {
        let (user_id, kind, claims) = self.decode(access_token, TokenScope::Access)?;
        let user = self.bound_user(kind, &user_id).await?;

        if let Some(reset_at) = user.last_password_reset_at {
            let issued_at = claims
                .extra_i64(ISSUED_AT_MICROS_CLAIM)
                .ok_or(IdentityError::AuthFailed)?;
            if issued_at < reset_at.timestamp_micros() {
                tracing::debug!(user_id = %user.id, "Access token predates password reset");
                return Err(IdentityError::AuthFailed);
            }
        }

        Ok(user)
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<AccessToken, IdentityError> {
        let (user_id, kind, claims) = self.decode(refresh_token, TokenScope::Refresh)?;
        let now = self.clock.now();

        let session = self
            .sessions
            .get(kind, &user_id)
            .await
            .map_err(internal)?
            .ok_or(IdentityError::AuthFailed)?;

        if session.kind != kind
            || claims.jti.as_deref() != Some(session.token_id.as_str())
            || session.is_expired(now)
        {
            tracing::info!(user_id = %user_id, "Refresh token is not the active one");
            return Err(IdentityError::AuthFailed);
        }

        let user = self.bound_user(kind, &user_id).await?;
        let (access_token, _) = self.sign(
            &user.id,
            user.kind,
            TokenScope::Access,
            now,
            self.policy.access_ttl,
        )?;

        Ok(AccessToken {
            access_token,
            expires_in: self.policy.access_ttl.num_seconds(),
        })
    }

    async fn revoke_tokens(&self, kind: Kind, user_id: &UserId) -> Result<(), IdentityError> {
        self.sessions.delete(kind, user_id).await.map_err(internal)?;
        tracing::info!(user_id = %user_id, kind = %kind, "Refresh session revoked");
        Ok(())
    }

    async fn get_user(&self, kind: Kind, id: &UserId) -> Result<User, IdentityError> {
        self.users
            .get(kind, id.as_str(), KeyType::Id)
            .await
            .map_err(passthrough)
    }

    async fn list_users(&self, kind: Kind) -> Result<Vec<User>, IdentityError> {
        self.users.list(kind).await.map_err(internal)
    }

    async fn update_profile(
        &self,
        kind: Kind,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, IdentityError> {
        let current = self.get_user(kind, id).await?;

        let updated = current.merge_profile(&update, self.clock.now());
        updated.validate()?;
        self.users
            .put(updated.clone(), false)
            .await
            .map_err(passthrough)?;

        tracing::info!(user_id = %id, "Profile updated");
        Ok(updated)
    }

    async fn reset_password(
        &self,
        kind: Kind,
        id: &UserId,
        new_password: &str,
    ) -> Result<User, IdentityError> {
        let mut user = self.get_user(kind, id).await?;

        let password_hash = self.hash_password(new_password).await?;
        user.set_password_hash(password_hash, self.clock.now());
        user.validate()?;
        self.users
            .put(user.clone(), false)
            .await
            .map_err(passthrough)?;
        self.sessions.delete(kind, id).await.map_err(internal)?;

        tracing::info!(user_id = %id, "Password reset");
        Ok(user)
    }

    async fn delete_user(&self, kind: Kind, id: &UserId) -> Result<(), IdentityError> {
        self.users.delete(kind, id).await.map_err(passthrough)?;
        self.sessions.delete(kind, id).await.map_err(internal)?;

        tracing::info!(user_id = %id, kind = %kind, "User deleted");
        Ok(())
    }
}
