//! Persistence gateway.
//!
//! One trait, two implementations: Postgres for deployments and an in-memory
//! store for tests and local runs.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{Storage, StoreError};
