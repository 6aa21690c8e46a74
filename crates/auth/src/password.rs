//! Password hashing (bcrypt).
//!
//! bcrypt salts every hash and compares in constant time during `verify`.

use thiserror::Error;

use petadopt_core::DomainError;

/// Work factor used in production; verification takes tens of milliseconds.
pub const DEFAULT_HASH_COST: u32 = 10;

/// bcrypt only looks at the first 72 bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Reject passwords bcrypt cannot hash faithfully.
pub fn validate_password(plaintext: &str) -> Result<(), DomainError> {
    if plaintext.is_empty() {
        return Err(DomainError::validation("password cannot be empty"));
    }
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(DomainError::validation(format!(
            "password cannot be longer than {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plaintext, cost)?)
}

/// Check `plaintext` against a stored hash. A malformed hash never matches.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    match bcrypt::verify(plaintext, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be verified");
            false
        }
    }
}
