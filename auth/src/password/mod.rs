pub mod argon2;
pub mod errors;

pub use argon2::HashCost;
pub use argon2::PasswordHasher;
pub use argon2::MIN_PASSWORD_LENGTH;
pub use errors::PasswordError;
