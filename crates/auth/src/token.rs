//! HS256 bearer tokens.
//!
//! Tokens carry a single identity claim (`username`) plus `iat` / `exp`.
//! Only HS256 is ever accepted, so a token re-signed with another algorithm
//! (or with `none`) fails validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use petadopt_core::Username;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Symmetric signing secret.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed token, bad signature, wrong algorithm or missing claim.
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// Signature was fine but the time window is not.
    #[error("invalid token: {0}")]
    Window(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    /// The configured lifetime cannot produce a usable `exp`.
    #[error("token lifetime out of range")]
    Lifetime,
}

/// Validates bearer tokens against a caller-supplied clock.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Issues and validates HS256 tokens with a fixed lifetime.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `username`, valid from `now` for the configured TTL.
    pub fn issue(&self, username: &Username, now: DateTime<Utc>) -> Result<String, TokenError> {
        if self.ttl <= Duration::zero() {
            return Err(TokenError::Lifetime);
        }
        let expires_at = now.checked_add_signed(self.ttl).ok_or(TokenError::Lifetime)?;
        let claims = TokenClaims::new(username.clone(), now, expires_at);
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by `validate_claims` against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenValidator for TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Self::validation())?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
