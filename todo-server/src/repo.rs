//! Per-user todo list repository
//!
//! Each user's list is one JSON array stored under `todos:<user_id>`.
//! Every mutation is a read-modify-write of the whole blob: two concurrent
//! writers for the same user can race and the later put wins. The design
//! accepts that lost-update anomaly; there is no versioning or conditional
//! put on the store.

use std::sync::Arc;

use todo_types::Todo;

use crate::error::ApiError;
use crate::store::KvStore;

/// Storage key for a user's todo list blob
fn todos_key(user_id: &str) -> String {
    format!("todos:{}", user_id)
}

/// Repository over the opaque key-value store, partitioned by user id.
///
/// The `user_id` passed in always comes from the authentication gate,
/// never from client input.
#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn KvStore>,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Load a user's full list; an absent key is an empty list.
    pub async fn load(&self, user_id: &str) -> Result<Vec<Todo>, ApiError> {
        let blob = self.store.get(&todos_key(user_id)).await?;

        match blob {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Corrupt todo blob in store");
                ApiError::internal(format!("Failed to decode todo list: {}", e))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Persist a user's full list, replacing the previous blob.
    pub async fn save(&self, user_id: &str, todos: &[Todo]) -> Result<(), ApiError> {
        let json = serde_json::to_string(todos)
            .map_err(|e| ApiError::internal(format!("Failed to encode todo list: {}", e)))?;

        self.store.put(&todos_key(user_id), json).await?;
        tracing::debug!(user_id = %user_id, todo_count = todos.len(), "Saved todo list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_todo(title: &str) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn repo() -> TodoRepository {
        TodoRepository::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn absent_key_is_an_empty_list() {
        assert!(repo().load("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_in_order() {
        let repo = repo();
        let todos = vec![sample_todo("first"), sample_todo("second")];
        repo.save("u1", &todos).await.unwrap();

        let loaded = repo.load("u1").await.unwrap();
        assert_eq!(loaded, todos);
    }

    #[tokio::test]
    async fn lists_are_partitioned_by_user() {
        let repo = repo();
        repo.save("alice", &[sample_todo("hers")]).await.unwrap();

        assert!(repo.load("bob").await.unwrap().is_empty());
        assert_eq!(repo.load("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_blob_surfaces_as_internal_error() {
        let store = Arc::new(MemoryKvStore::new());
        store.put("todos:u1", "not json".to_string()).await.unwrap();

        let repo = TodoRepository::new(store);
        assert!(matches!(
            repo.load("u1").await.unwrap_err(),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn concurrent_read_modify_write_is_last_write_wins() {
        // Known limitation: two writers over the same stale snapshot race,
        // and the second save clobbers the first.
        let repo = repo();

        let snapshot_a = repo.load("u1").await.unwrap();
        let snapshot_b = repo.load("u1").await.unwrap();

        let mut a = snapshot_a;
        a.push(sample_todo("from a"));
        repo.save("u1", &a).await.unwrap();

        let mut b = snapshot_b;
        b.push(sample_todo("from b"));
        repo.save("u1", &b).await.unwrap();

        let survived = repo.load("u1").await.unwrap();
        assert_eq!(survived.len(), 1);
        assert_eq!(survived[0].title, "from b");
    }
}
