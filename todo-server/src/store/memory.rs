//! In-memory key-value store
//!
//! Backs the service in development and in tests. Values do not survive a
//! restart, which the startup path warns about.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{KvStore, StoreError};

/// In-memory store over a concurrent map
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_none_for_absent_key() {
        let store = MemoryKvStore::new();
        assert!(store.get("todos:nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_value() {
        let store = MemoryKvStore::new();
        store.put("todos:u1", "[1]".to_string()).await.unwrap();
        store.put("todos:u1", "[2]".to_string()).await.unwrap();
        assert_eq!(store.get("todos:u1").await.unwrap().as_deref(), Some("[2]"));
    }
}
