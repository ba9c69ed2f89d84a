use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::errors::IdentityError;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::KeyType;
use crate::domain::user::models::Kind;
use crate::domain::user::models::Profile;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserStore;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> IdentityError {
    IdentityError::Internal(format!("Database error: {}", e))
}

fn corrupt_row(e: impl std::fmt::Display) -> IdentityError {
    IdentityError::Internal(format!("Corrupt user row: {}", e))
}

fn write_error(e: sqlx::Error, user: &User) -> IdentityError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_kind_email_key") => IdentityError::Conflict(format!(
                    "email '{}' is already registered",
                    user.email
                )),
                Some("users_kind_username_key") => IdentityError::Conflict(format!(
                    "username '{}' is already taken",
                    user.username
                )),
                _ => IdentityError::Conflict(format!("user id '{}' already exists", user.id)),
            };
        }
    }
    database_error(e)
}

struct UserRow {
    id: String,
    kind: String,
    email: String,
    username: String,
    password_hash: String,
    name: Option<String>,
    gender: Option<String>,
    locale: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_password_reset_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = IdentityError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id).map_err(corrupt_row)?,
            kind: row.kind.parse::<Kind>().map_err(corrupt_row)?,
            email: EmailAddress::new(row.email).map_err(corrupt_row)?,
            username: Username::new(row.username).map_err(corrupt_row)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_password_reset_at: row.last_password_reset_at,
            profile: Profile {
                name: row.name,
                gender: row.gender,
                locale: row.locale,
                location: row.location,
                avatar_url: row.avatar_url,
            },
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get(&self, kind: Kind, key: &str, key_type: KeyType) -> Result<User, IdentityError> {
        let row = match key_type {
            KeyType::Id => {
                sqlx::query_as!(
                    UserRow,
                    r#"
                    SELECT id, kind, email, username, password_hash, name, gender, locale,
                           location, avatar_url, created_at, updated_at, last_password_reset_at
                    FROM users
                    WHERE kind = $1 AND id = $2
                    "#,
                    kind.as_str(),
                    key,
                )
                .fetch_optional(&self.pool)
                .await
            }
            KeyType::Email => {
                sqlx::query_as!(
                    UserRow,
                    r#"
                    SELECT id, kind, email, username, password_hash, name, gender, locale,
                           location, avatar_url, created_at, updated_at, last_password_reset_at
                    FROM users
                    WHERE kind = $1 AND lower(email) = lower($2)
                    "#,
                    kind.as_str(),
                    key,
                )
                .fetch_optional(&self.pool)
                .await
            }
            KeyType::Username => {
                sqlx::query_as!(
                    UserRow,
                    r#"
                    SELECT id, kind, email, username, password_hash, name, gender, locale,
                           location, avatar_url, created_at, updated_at, last_password_reset_at
                    FROM users
                    WHERE kind = $1 AND username = $2
                    "#,
                    kind.as_str(),
                    key,
                )
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(database_error)?;

        match row {
            Some(row) => User::try_from(row),
            None => Err(IdentityError::NotFound(format!("user '{}'", key))),
        }
    }

    async fn put(&self, user: User, only_create: bool) -> Result<(), IdentityError> {
        let result = if only_create {
            sqlx::query!(
                r#"
                INSERT INTO users (id, kind, email, username, password_hash, name, gender, locale,
                                   location, avatar_url, created_at, updated_at,
                                   last_password_reset_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
                user.id.as_str(),
                user.kind.as_str(),
                user.email.as_str(),
                user.username.as_str(),
                user.password_hash,
                user.profile.name,
                user.profile.gender,
                user.profile.locale,
                user.profile.location,
                user.profile.avatar_url,
                user.created_at,
                user.updated_at,
                user.last_password_reset_at,
            )
            .execute(&self.pool)
            .await
        } else {
            sqlx::query!(
                r#"
                INSERT INTO users (id, kind, email, username, password_hash, name, gender, locale,
                                   location, avatar_url, created_at, updated_at,
                                   last_password_reset_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (kind, id) DO UPDATE SET
                    email = EXCLUDED.email,
                    username = EXCLUDED.username,
                    password_hash = EXCLUDED.password_hash,
                    name = EXCLUDED.name,
                    gender = EXCLUDED.gender,
                    locale = EXCLUDED.locale,
                    location = EXCLUDED.location,
                    avatar_url = EXCLUDED.avatar_url,
                    updated_at = EXCLUDED.updated_at,
                    last_password_reset_at = EXCLUDED.last_password_reset_at
                "#,
                user.id.as_str(),
                user.kind.as_str(),
                user.email.as_str(),
                user.username.as_str(),
                user.password_hash,
                user.profile.name,
                user.profile.gender,
                user.profile.locale,
                user.profile.location,
                user.profile.avatar_url,
                user.created_at,
                user.updated_at,
                user.last_password_reset_at,
            )
            .execute(&self.pool)
            .await
        };

        result.map_err(|e| write_error(e, &user))?;
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &UserId) -> Result<(), IdentityError> {
        let result = sqlx::query!(
            "DELETE FROM users WHERE kind = $1 AND id = $2",
            kind.as_str(),
            id.as_str(),
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound(format!("user '{}'", id)));
        }

        Ok(())
    }

    async fn list(&self, kind: Kind) -> Result<Vec<User>, IdentityError> {
        let rows = sqlx::query_as!(
            UserRow,
            r#"
            SELECT id, kind, email, username, password_hash, name, gender, locale,
                   location, avatar_url, created_at, updated_at, last_password_reset_at
            FROM users
            WHERE kind = $1
            ORDER BY created_at
            "#,
            kind.as_str(),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(User::try_from).collect()
    }
}

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn put(&self, session: RefreshSession) -> Result<(), IdentityError> {
        sqlx::query!(
            r#"
            INSERT INTO refresh_sessions (kind, user_id, token_id, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (kind, user_id) DO UPDATE SET
                token_id = EXCLUDED.token_id,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at
            "#,
            session.kind.as_str(),
            session.user_id.as_str(),
            session.token_id,
            session.issued_at,
            session.expires_at,
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn get(
        &self,
        kind: Kind,
        user_id: &UserId,
    ) -> Result<Option<RefreshSession>, IdentityError> {
        let row = sqlx::query!(
            r#"
            SELECT token_id, issued_at, expires_at
            FROM refresh_sessions
            WHERE kind = $1 AND user_id = $2
            "#,
            kind.as_str(),
            user_id.as_str(),
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| RefreshSession {
            user_id: user_id.clone(),
            kind,
            token_id: r.token_id,
            issued_at: r.issued_at,
            expires_at: r.expires_at,
        }))
    }

    async fn delete(&self, kind: Kind, user_id: &UserId) -> Result<(), IdentityError> {
        sqlx::query!(
            "DELETE FROM refresh_sessions WHERE kind = $1 AND user_id = $2",
            kind.as_str(),
            user_id.as_str(),
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }
}
