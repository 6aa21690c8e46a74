//! `petadopt-core`: domain value objects shared by every layer.
//!
//! This crate contains **pure domain** types (no storage, no transport).

pub mod error;
pub mod id;
pub mod listing;
pub mod username;

pub use error::{DomainError, DomainResult};
pub use id::{ListingId, UserId};
pub use listing::{Listing, ListingUpdate, NewListing, Sex};
pub use username::Username;
