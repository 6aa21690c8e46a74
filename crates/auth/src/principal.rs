use petadopt_core::Username;

use crate::claims::TokenClaims;

/// Identity of an authenticated caller, derived from a validated token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    username: Username,
}

impl Principal {
    pub fn new(username: Username) -> Self {
        Self { username }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Ownership check: the caller owns a resource listed by `owner`.
    pub fn owns(&self, owner: &Username) -> bool {
        &self.username == owner
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self::new(claims.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owns_compares_normalized_usernames() {
        let alice = Principal::new(Username::parse("Alice").unwrap());
        assert!(alice.owns(&Username::parse("alice").unwrap()));
        assert!(!alice.owns(&Username::parse("bob").unwrap()));
    }
}
