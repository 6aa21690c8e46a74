//! `petadopt-auth`: credentials, bearer tokens and authenticated identity.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod principal;
pub mod token;
pub mod user;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use password::{DEFAULT_HASH_COST, PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use token::{SigningSecret, TokenError, TokenService, TokenValidator};
pub use user::{NewUser, User, UserError};
