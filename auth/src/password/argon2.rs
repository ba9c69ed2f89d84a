use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Work factor for Argon2id.
///
/// Defaults target roughly 100ms per hash on commodity hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// Password hashing implementation.
///
/// Combines a service-wide secret with the plaintext and applies Argon2id
/// with a random per-hash salt. The output is a PHC string carrying the
/// algorithm id, cost parameters, salt and hash.
#[derive(Clone)]
pub struct PasswordHasher {
    secret: Vec<u8>,
    params: Params,
}

impl PasswordHasher {
    /// Create a new password hasher.
    ///
    /// # Arguments
    /// * `secret` - Service-wide salt mixed into every hash
    /// * `cost` - Argon2id work factor
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Cost parameters or secret rejected by Argon2
    pub fn new(secret: impl Into<Vec<u8>>, cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidConfiguration(e.to_string()))?;
        let hasher = Self {
            secret: secret.into(),
            params,
        };
        // Surface an oversized secret at construction instead of on first hash.
        hasher.argon2()?;
        Ok(hasher)
    }

    fn argon2(&self) -> Result<Argon2<'_>, PasswordError> {
        Argon2::new_with_secret(
            &self.secret,
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| PasswordError::InvalidConfiguration(e.to_string()))
    }

    /// Hash a plaintext password.
    ///
    /// # Errors
    /// * `TooShort` - Password has fewer than `MIN_PASSWORD_LENGTH` characters
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let length = password.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: length,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Comparison is constant-time. A mismatch is `Ok(false)`, never an error.
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_cost() -> HashCost {
        HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_embeds_cost_parameters() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        let hash = hasher.hash("correct horse battery").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        let first = hasher.hash("longenoughpwd").unwrap();
        let second = hasher.hash("longenoughpwd").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_password_rejected() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        let result = hasher.hash("short");
        assert!(matches!(
            result,
            Err(PasswordError::TooShort { min: 10, actual: 5 })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        // 9 characters, 18 bytes
        assert!(hasher.hash("ééééééééé").is_err());
        assert!(hasher.hash("éééééééééé").is_ok());
    }

    #[test]
    fn test_secret_is_part_of_the_hash() {
        let hasher = PasswordHasher::new("pepper-one", cheap_cost()).unwrap();
        let other = PasswordHasher::new("pepper-two", cheap_cost()).unwrap();

        let hash = hasher.hash("longenoughpwd").unwrap();
        assert!(!other.verify("longenoughpwd", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new("pepper", cheap_cost()).unwrap();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            PasswordHasher::new("pepper", cost),
            Err(PasswordError::InvalidConfiguration(_))
        ));
    }
}
