//! User accounts.

use chrono::{DateTime, Utc};
use thiserror::Error;

use petadopt_core::{DomainError, UserId, Username};

use crate::password::{PasswordError, hash_password, validate_password, verify_password};

/// A stored user account.
///
/// Accounts are created on signup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn verify_password(&self, plaintext: &str) -> bool {
        verify_password(plaintext, &self.password_hash)
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// A validated signup, ready to be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl NewUser {
    /// Validate and hash the password for an already-normalized username.
    ///
    /// This is CPU-heavy (bcrypt); async callers should run it on a blocking
    /// thread.
    pub fn register(username: Username, password: &str, cost: u32) -> Result<Self, UserError> {
        validate_password(password)?;
        let password_hash = hash_password(password, cost)?;
        Ok(Self {
            username,
            password_hash,
        })
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
