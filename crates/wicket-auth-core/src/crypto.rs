//! Password hashing
//!
//! Argon2id with per-credential random salts. Verification distinguishes a
//! mismatch from a malformed stored hash so callers can report the former as
//! an authentication failure and the latter as an internal one.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Password hashing and verification errors
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hashing failed
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Stored hash does not parse as a PHC string
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Password does not match the stored hash
    #[error("password mismatch")]
    Mismatch,
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::Hash(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|err| match err {
            argon2::password_hash::Error::Password => PasswordError::Mismatch,
            _ => PasswordError::MalformedHash,
        })
}
