//! Key-value storage module
//!
//! The todo service treats its storage engine as an opaque string-key to
//! string-value store; each user's entire todo list lives under a single
//! key as one JSON blob. Two backends exist:
//! - **Memory** (DashMap): development and tests, lost on restart.
//! - **Postgres** (sqlx): persistent, selected when `DATABASE_URL` is set.

mod memory;
mod postgres;

pub use memory::MemoryKvStore;
pub use postgres::PostgresKvStore;

use async_trait::async_trait;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Opaque get/put-by-key store.
///
/// Writes replace the whole value for a key; there is no conditional put,
/// so concurrent read-modify-write cycles over the same key are
/// last-write-wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
}
