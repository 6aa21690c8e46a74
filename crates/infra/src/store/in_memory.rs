use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use petadopt_auth::{NewUser, User};
use petadopt_core::{Listing, ListingId, ListingUpdate, NewListing, UserId, Username};

use super::r#trait::{Storage, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Username, User>,
    listings: BTreeMap<ListingId, Listing>,
    last_user_id: i64,
    last_listing_id: i64,
}

/// In-memory store.
///
/// Intended for tests/dev. A single lock guards both tables so the owner
/// foreign key and id sequences stay consistent.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for InMemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.username) {
            return Err(StoreError::username_taken(&user.username));
        }

        tables.last_user_id += 1;
        let stored = User {
            id: UserId::new(tables.last_user_id),
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.username.clone(), stored.clone());
        Ok(stored)
    }

    async fn user_exists(&self, username: &Username) -> Result<bool, StoreError> {
        Ok(self.read()?.users.contains_key(username))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, StoreError> {
        self.read()?
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(username))
    }

    async fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&listing.listed_by) {
            return Err(StoreError::user_not_found(&listing.listed_by));
        }

        tables.last_listing_id += 1;
        let now = Utc::now();
        let stored = Listing {
            id: ListingId::new(tables.last_listing_id),
            listed_by: listing.listed_by,
            name: listing.name,
            pet_type: listing.pet_type,
            breed: listing.breed,
            sex: listing.sex,
            date_of_birth: listing.date_of_birth,
            created_at: now,
            updated_at: now,
        };
        tables.listings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_listing_by_id(&self, id: ListingId) -> Result<Listing, StoreError> {
        self.read()?
            .listings
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::listing_not_found(id))
    }

    async fn get_listings(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.read()?.listings.values().cloned().collect())
    }

    async fn get_listings_by_username(&self, username: &Username) -> Result<Vec<Listing>, StoreError> {
        Ok(self
            .read()?
            .listings
            .values()
            .filter(|l| &l.listed_by == username)
            .cloned()
            .collect())
    }

    async fn update_listing(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError> {
        let mut tables = self.write()?;
        let listing = tables
            .listings
            .get_mut(&id)
            .ok_or_else(|| StoreError::listing_not_found(id))?;
        update.apply_to(listing, Utc::now());
        Ok(listing.clone())
    }

    async fn delete_listing_by_id(&self, id: ListingId) -> Result<(), StoreError> {
        self.write()?
            .listings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::listing_not_found(id))
    }

    async fn check_ownership(&self, username: &Username, id: ListingId) -> Result<bool, StoreError> {
        self.read()?
            .listings
            .get(&id)
            .map(|l| &l.listed_by == username)
            .ok_or_else(|| StoreError::listing_not_found(id))
    }
}
