//! Case-normalized account names.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Longest accepted username (matches the storage column width).
pub const MAX_USERNAME_LEN: usize = 50;

/// Names that collide with top-level route segments.
pub const RESERVED_USERNAMES: &[&str] = &["health", "listings", "login", "signup"];

/// A validated, lower-cased username.
///
/// Usernames identify accounts case-insensitively: `"Alice"` and `"alice"`
/// are the same user. Whitespace is never allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and normalize a raw username.
    ///
    /// Checks run on the lower-cased form, which can be longer than the
    /// input (`"İ"` lowercases to two chars).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }
        if normalized.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username cannot be longer than {MAX_USERNAME_LEN} characters"
            )));
        }
        if RESERVED_USERNAMES.contains(&normalized.as_str()) {
            return Err(DomainError::validation(format!("username {normalized} is reserved")));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
