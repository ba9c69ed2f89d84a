use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenScope;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and JWT handling.
///
/// Issued tokens always carry the configured issuer, and validation is
/// scope-aware so a refresh token is never accepted where an access token
/// is expected (and vice versa).
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    issuer: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Configured credential codec
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `issuer` - Value written to and required in the `iss` claim
    pub fn new(password_hasher: PasswordHasher, jwt_secret: &[u8], issuer: impl ToString) -> Self {
        let issuer = issuer.to_string();
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret).with_issuer(&issuer),
            issuer,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Password too short or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Sign claims, stamping the configured issuer.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, claims: Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(&claims.with_issuer(&self.issuer))
    }

    /// Validate a token and check it was issued for `scope`.
    ///
    /// # Errors
    /// * `WrongScope` - Token scope differs from `scope`
    /// * `JwtError` - Signature, expiry, issuer or format check failed
    pub fn validate_token(&self, token: &str, scope: TokenScope) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.scope != Some(scope) {
            return Err(JwtError::WrongScope { expected: scope });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::password::HashCost;

    fn authenticator() -> Authenticator {
        let cost = HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let hasher = PasswordHasher::new("pepper", cost).unwrap();
        Authenticator::new(hasher, b"test_secret_key_at_least_32_bytes!", "identity-test")
    }

    #[test]
    fn test_verify_password_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password_1")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password_1", &hash).is_ok());
    }

    #[test]
    fn test_verify_password_mismatch() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password_1")
            .expect("Failed to hash password");

        let result = authenticator.verify_password("wrong_password", &hash);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let authenticator = authenticator();
        let result = authenticator.verify_password("my_password_1", "not-a-phc-string");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();
        let claims = Claims::for_subject("user123", TokenScope::Access, Utc::now(), Duration::minutes(5));

        let token = authenticator
            .issue_token(claims)
            .expect("Failed to generate token");

        let decoded = authenticator
            .validate_token(&token, TokenScope::Access)
            .expect("Failed to validate token");

        assert_eq!(decoded.sub, Some("user123".to_string()));
        assert_eq!(decoded.iss, Some("identity-test".to_string()));
    }

    #[test]
    fn test_validate_rejects_other_scope() {
        let authenticator = authenticator();
        let claims = Claims::for_subject("user123", TokenScope::Refresh, Utc::now(), Duration::minutes(5));
        let token = authenticator.issue_token(claims).unwrap();

        let result = authenticator.validate_token(&token, TokenScope::Access);
        assert!(matches!(
            result,
            Err(JwtError::WrongScope {
                expected: TokenScope::Access
            })
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();
        let result = authenticator.validate_token("invalid.token.here", TokenScope::Access);
        assert!(result.is_err());
    }
}
