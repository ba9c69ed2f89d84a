//! Credential and token utilities
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (Argon2id with a service-wide secret)
//! - JWT token generation and scope-aware validation
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::new("service-salt", HashCost::default()).unwrap();
//! let hash = hasher.hash("my_long_password").unwrap();
//! assert!(hasher.verify("my_long_password", &hash).unwrap());
//! assert!(hasher.hash("short").is_err());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Authenticator, Claims, HashCost, PasswordHasher, TokenScope};
//! use chrono::{Duration, Utc};
//!
//! let hasher = PasswordHasher::new("service-salt", HashCost::default()).unwrap();
//! let auth = Authenticator::new(hasher, b"secret_key_at_least_32_bytes_long!", "identity");
//!
//! let claims = Claims::for_subject("user123", TokenScope::Access, Utc::now(), Duration::minutes(15));
//! let token = auth.issue_token(claims).unwrap();
//!
//! let decoded = auth.validate_token(&token, TokenScope::Access).unwrap();
//! assert_eq!(decoded.sub.as_deref(), Some("user123"));
//! assert!(auth.validate_token(&token, TokenScope::Refresh).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenScope;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::MIN_PASSWORD_LENGTH;
