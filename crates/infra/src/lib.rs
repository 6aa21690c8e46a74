//! Infrastructure layer: persistence and configuration.

pub mod config;
pub mod store;

pub use config::AppConfig;
pub use store::{InMemoryStore, PostgresStore, Storage, StoreError};
