use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::domain::errors::IdentityError;
use crate::domain::ports::RandomSource;
use crate::domain::ports::CHARSET_LOWER_NUM;
use crate::domain::ports::CHARSET_NUMS;
use crate::user::errors::EmailError;
use crate::user::errors::KindError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

const GENERATED_ID_LENGTH: usize = 16;
const GENERATED_USERNAME_PREFIX: &str = "user";
const GENERATED_USERNAME_DIGITS: usize = 5;
const DEFAULT_AVATAR_SIZE: u32 = 128;
const MAX_AVATAR_SIZE: u32 = 2048;

/// Account role partitioning the user namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    User,
    Admin,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::User => "user",
            Kind::Admin => "admin",
        }
    }
}

impl FromStr for Kind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Kind::User),
            "admin" => Ok(Kind::Admin),
            other => Err(KindError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute used to look a user up in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Id,
    Email,
    Username,
}

fn is_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// User unique identifier type
///
/// Opaque, immutable once assigned, matches `^[A-Za-z0-9_]+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Generate a new random user ID.
    pub fn generate(random: &dyn RandomSource) -> Self {
        Self(random.string(GENERATED_ID_LENGTH, CHARSET_LOWER_NUM))
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `Empty` - String is empty
    /// * `InvalidCharacters` - String contains characters outside `[A-Za-z0-9_]`
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdError> {
        let id = id.into();
        if id.is_empty() {
            Err(UserIdError::Empty)
        } else if !is_identifier(&id) {
            Err(UserIdError::InvalidCharacters)
        } else {
            Ok(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Human-facing unique handle, matches `^[A-Za-z0-9_]+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty
    /// * `TooLong` - Username longer than 64 characters
    /// * `InvalidCharacters` - Contains characters outside `[A-Za-z0-9_]`
    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into();
        let length = username.chars().count();
        if length == 0 {
            Err(UsernameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else if !is_identifier(&username) {
            Err(UsernameError::InvalidCharacters)
        } else {
            Ok(Self(username))
        }
    }

    /// Generate a default username: `user` followed by five digits.
    pub fn generate(random: &dyn RandomSource) -> Self {
        Self(format!(
            "{}{}",
            GENERATED_USERNAME_PREFIX,
            random.string(GENERATED_USERNAME_DIGITS, CHARSET_NUMS)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Missing` - Email is empty
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: impl Into<String>) -> Result<Self, EmailError> {
        let email = email.into();
        if email.is_empty() {
            return Err(EmailError::Missing);
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Returns true if `s` parses as an email address.
    pub fn is_valid(s: &str) -> bool {
        email_address::EmailAddress::is_valid(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for case-insensitive comparison.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional profile data attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

/// User aggregate entity.
///
/// Represents one registered account. Never holds a plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub kind: Kind,
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_password_reset_at: Option<DateTime<Utc>>,
    pub profile: Profile,
}

impl User {
    /// Check the invariants not already guaranteed by the field types.
    ///
    /// Called before every persistence write.
    ///
    /// # Errors
    /// * `InvalidInput` - Password hash missing or `updated_at` before `created_at`
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.password_hash.is_empty() {
            return Err(IdentityError::InvalidInput(
                "password must be set".to_string(),
            ));
        }
        if self.updated_at < self.created_at {
            return Err(IdentityError::InvalidInput(
                "updated_at must not precede created_at".to_string(),
            ));
        }
        Ok(())
    }

    /// Store a freshly computed password hash.
    pub fn set_password_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.password_hash = hash;
        self.last_password_reset_at = Some(now);
        self.updated_at = now;
    }

    /// Apply a partial profile update.
    ///
    /// Keeps identity fields from `self`, takes each field of `update` when it
    /// is non-blank and always sets `updated_at` to `now`.
    pub fn merge_profile(&self, update: &ProfileUpdate, now: DateTime<Utc>) -> User {
        let base = &self.profile;
        User {
            id: self.id.clone(),
            kind: self.kind,
            email: update.email.clone().unwrap_or_else(|| self.email.clone()),
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
            created_at: self.created_at,
            updated_at: now,
            last_password_reset_at: self.last_password_reset_at,
            profile: Profile {
                name: pick_non_empty(&update.name, &base.name),
                gender: pick_non_empty(&update.gender, &base.gender),
                locale: pick_non_empty(&update.locale, &base.locale),
                location: pick_non_empty(&update.location, &base.location),
                avatar_url: pick_non_empty(&update.avatar_url, &base.avatar_url),
            },
        }
    }
}

fn pick_non_empty(preferred: &Option<String>, fallback: &Option<String>) -> Option<String> {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Gravatar URL for an email address.
///
/// The hash is SHA-256 over the trimmed, lowercased address. Sizes outside
/// `(0, 2048)` fall back to 128.
pub fn gravatar_url(email: &str, size: u32) -> String {
    let size = if size == 0 || size >= MAX_AVATAR_SIZE {
        DEFAULT_AVATAR_SIZE
    } else {
        size
    };
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s={}",
        hex::encode(digest),
        size
    )
}

/// Account data supplied at registration, before defaults are assigned.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub kind: Kind,
    pub email: String,
    pub username: Option<String>,
    pub profile: Profile,
}

impl NewUser {
    pub fn new(kind: Kind, email: impl Into<String>) -> Self {
        Self {
            kind,
            email: email.into(),
            username: None,
            profile: Profile::default(),
        }
    }

    /// Build a `User` with generated id, default username, timestamps and
    /// avatar fallback. The password hash is left empty.
    ///
    /// # Errors
    /// * `InvalidInput` - Email absent or malformed, or supplied username invalid
    pub fn sanitize_for_create(
        self,
        now: DateTime<Utc>,
        random: &dyn RandomSource,
    ) -> Result<User, IdentityError> {
        let email = EmailAddress::new(self.email.trim())?;

        let username = match self.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Username::new(name)?,
            _ => Username::generate(random),
        };

        let mut profile = self.profile;
        if profile.avatar_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
            profile.avatar_url = Some(gravatar_url(email.as_str(), 0));
        }

        Ok(User {
            id: UserId::generate(random),
            kind: self.kind,
            email,
            username,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
            last_password_reset_at: None,
            profile,
        })
    }
}

/// Partial profile update. Blank or absent fields leave the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<EmailAddress>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}
