//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Username already taken (race with `user_exists`) |
//! | Database (foreign key violation) | `23503` | `NotFound` | Listing owner does not exist |
//! | Database (other) | Any other | `Database` | Check constraints, syntax, permissions |
//! | Other | N/A | `Database` | Pool closed, network errors, decode failures |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; the SQLx pool handles connection sharing
//! and the engine's transaction isolation is the only concurrency control.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use petadopt_auth::{NewUser, User};
use petadopt_core::{Listing, ListingId, ListingUpdate, NewListing, Sex, UserId, Username};

use super::r#trait::{Storage, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL UNIQUE
            CHECK (username <> '' AND username !~ '\s' AND username = lower(username)),
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listing (
        id BIGSERIAL PRIMARY KEY,
        listed_by VARCHAR(50) NOT NULL REFERENCES "user" (username),
        name VARCHAR(100) NOT NULL,
        pet_type VARCHAR(50) NOT NULL,
        breed VARCHAR(50) NOT NULL DEFAULT '',
        sex VARCHAR(1) NOT NULL CHECK (sex IN ('m', 'f')),
        dob DATE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS listing_listed_by_idx ON listing (listed_by)",
];

const LISTING_COLUMNS: &str =
    "id, listed_by, name, pet_type, breed, sex, dob, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, password_hash, created_at";

/// Postgres-backed implementation of [`Storage`].
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and make sure at least one connection can be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Storage for PostgresStore {
    #[instrument(skip(self), err)]
    async fn init(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("init", e))?;
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("init", e))?;
        }
        tx.commit().await.map_err(|e| map_sqlx_error("init", e))?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO "user" (username, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"#
        ))
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("create_user", e) {
            StoreError::Conflict(_) => StoreError::username_taken(&user.username),
            other => other,
        })?;

        user_from_row(&row)
    }

    #[instrument(skip(self), fields(username = %username), err)]
    async fn user_exists(&self, username: &Username) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM "user" WHERE username = $1)"#)
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_exists", e))
    }

    #[instrument(skip(self), fields(username = %username), err)]
    async fn get_user_by_username(&self, username: &Username) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE username = $1"#))
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user_by_username", e))?
            .ok_or_else(|| StoreError::user_not_found(username))?;

        user_from_row(&row)
    }

    #[instrument(skip(self, listing), fields(listed_by = %listing.listed_by), err)]
    async fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO listing (listed_by, name, pet_type, breed, sex, dob) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {LISTING_COLUMNS}"
        ))
        .bind(listing.listed_by.as_str())
        .bind(&listing.name)
        .bind(&listing.pet_type)
        .bind(&listing.breed)
        .bind(listing.sex.as_str())
        .bind(listing.date_of_birth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("create_listing", e) {
            StoreError::NotFound(_) => StoreError::user_not_found(&listing.listed_by),
            other => other,
        })?;

        listing_from_row(&row)
    }

    #[instrument(skip(self), fields(listing_id = %id), err)]
    async fn get_listing_by_id(&self, id: ListingId) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listing WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_listing_by_id", e))?
            .ok_or_else(|| StoreError::listing_not_found(id))?;

        listing_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn get_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listing ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_listings", e))?;

        rows.iter().map(listing_from_row).collect()
    }

    #[instrument(skip(self), fields(username = %username), err)]
    async fn get_listings_by_username(&self, username: &Username) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listing WHERE listed_by = $1 ORDER BY id ASC"
        ))
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_listings_by_username", e))?;

        rows.iter().map(listing_from_row).collect()
    }

    #[instrument(skip(self, update), fields(listing_id = %id), err)]
    async fn update_listing(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE listing SET \
                name = COALESCE($2, name), \
                pet_type = COALESCE($3, pet_type), \
                breed = COALESCE($4, breed), \
                sex = COALESCE($5, sex), \
                dob = COALESCE($6, dob), \
                updated_at = now() \
             WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id.get())
        .bind(update.name)
        .bind(update.pet_type)
        .bind(update.breed)
        .bind(update.sex.map(|s| s.as_str()))
        .bind(update.date_of_birth)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_listing", e))?
        .ok_or_else(|| StoreError::listing_not_found(id))?;

        listing_from_row(&row)
    }

    #[instrument(skip(self), fields(listing_id = %id), err)]
    async fn delete_listing_by_id(&self, id: ListingId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM listing WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_listing_by_id", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::listing_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(username = %username, listing_id = %id), err)]
    async fn check_ownership(&self, username: &Username, id: ListingId) -> Result<bool, StoreError> {
        let owner = sqlx::query_scalar::<_, String>("SELECT listed_by FROM listing WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("check_ownership", e))?
            .ok_or_else(|| StoreError::listing_not_found(id))?;

        Ok(owner == username.as_str())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode user row", e);
    let username: String = row.try_get("username").map_err(decode)?;

    Ok(User {
        id: UserId::new(row.try_get("id").map_err(decode)?),
        username: Username::parse(&username)
            .map_err(|e| StoreError::Database(format!("corrupt username column: {e}")))?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
    })
}

fn listing_from_row(row: &PgRow) -> Result<Listing, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode listing row", e);
    let listed_by: String = row.try_get("listed_by").map_err(decode)?;
    let sex: String = row.try_get("sex").map_err(decode)?;

    Ok(Listing {
        id: ListingId::new(row.try_get("id").map_err(decode)?),
        listed_by: Username::parse(&listed_by)
            .map_err(|e| StoreError::Database(format!("corrupt listed_by column: {e}")))?,
        name: row.try_get("name").map_err(decode)?,
        pet_type: row.try_get("pet_type").map_err(decode)?,
        breed: row.try_get("breed").map_err(decode)?,
        sex: sex
            .parse::<Sex>()
            .map_err(|e| StoreError::Database(format!("corrupt sex column: {e}")))?,
        date_of_birth: row.try_get::<NaiveDate, _>("dob").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {operation}")),
        other => StoreError::Database(format!("sqlx error in {operation}: {other}")),
    }
}
