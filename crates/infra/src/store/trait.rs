use async_trait::async_trait;
use thiserror::Error;

use petadopt_auth::{NewUser, User};
use petadopt_core::{Listing, ListingId, ListingUpdate, NewListing, Username};

/// Persistence operation error.
///
/// `NotFound` and `Conflict` are expected outcomes callers branch on;
/// `Database` is an opaque infrastructure failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn listing_not_found(id: ListingId) -> Self {
        Self::NotFound(format!("listing {id}"))
    }

    pub fn user_not_found(username: &Username) -> Self {
        Self::NotFound(format!("user {username}"))
    }

    pub fn username_taken(username: &Username) -> Self {
        Self::Conflict(format!("username {username} is taken"))
    }
}

/// Persistence gateway for users and listings.
///
/// ## Semantics
///
/// - Usernames passed in are already normalized; implementations compare them
///   exactly.
/// - List operations return listings ordered by id ascending.
/// - `delete_listing_by_id` is not idempotent: deleting a missing listing is
///   `NotFound`.
/// - `check_ownership` is `NotFound` when the listing is absent, otherwise it
///   reports whether `username` is the owner.
///
/// Implementations must be safe to share across request tasks; concurrency
/// control is delegated to the backing engine.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the schema if it does not exist yet. Idempotent.
    async fn init(&self) -> Result<(), StoreError>;

    /// Store a new user; `Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn user_exists(&self, username: &Username) -> Result<bool, StoreError>;

    async fn get_user_by_username(&self, username: &Username) -> Result<User, StoreError>;

    /// Store a new listing, assigning its id and timestamps.
    async fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    async fn get_listing_by_id(&self, id: ListingId) -> Result<Listing, StoreError>;

    async fn get_listings(&self) -> Result<Vec<Listing>, StoreError>;

    async fn get_listings_by_username(&self, username: &Username) -> Result<Vec<Listing>, StoreError>;

    /// Apply a partial update and bump `updated_at`. The owner never changes.
    async fn update_listing(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError>;

    async fn delete_listing_by_id(&self, id: ListingId) -> Result<(), StoreError>;

    async fn check_ownership(&self, username: &Username, id: ListingId) -> Result<bool, StoreError>;
}
