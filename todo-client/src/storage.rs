//! Durable session storage
//!
//! The session manager persists exactly two entries per configured prefix:
//! `<prefix>authToken` and `<prefix>currentUser` (JSON). The prefix keeps
//! several sessions from colliding in the same storage domain. Absence of
//! either entry means logged out.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use todo_types::User;

/// Storage failures. The session manager never fails a ceremony over
/// these; they are logged and the in-memory session carries on.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable store for the persisted `{token, user}` pair.
pub trait SessionStore: Send + Sync {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError>;

    /// The persisted pair, or `None` when absent, partial, or unreadable.
    fn load(&self) -> Option<(String, User)>;

    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        (**self).save(token, user)
    }

    fn load(&self) -> Option<(String, User)> {
        (**self).load()
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// In-memory store, for tests and short-lived embedders.
#[derive(Default)]
pub struct MemorySessionStore {
    entry: Mutex<Option<(String, User)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        *self.entry.lock().expect("session store lock poisoned") =
            Some((token.to_string(), user.clone()));
        Ok(())
    }

    fn load(&self) -> Option<(String, User)> {
        self.entry.lock().expect("session store lock poisoned").clone()
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.entry.lock().expect("session store lock poisoned") = None;
        Ok(())
    }
}

/// File-backed store: one file per entry under a directory, prefix in the
/// file name. Survives process restarts the way localStorage survives
/// page loads.
pub struct FileSessionStore {
    dir: PathBuf,
    prefix: String,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(format!("{}authToken", self.prefix))
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(format!("{}currentUser", self.prefix))
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.token_path(), token)?;
        fs::write(self.user_path(), serde_json::to_vec(user)?)?;
        Ok(())
    }

    fn load(&self) -> Option<(String, User)> {
        let token = fs::read_to_string(self.token_path()).ok()?;
        let user_json = fs::read(self.user_path()).ok()?;
        let user = serde_json::from_slice(&user_json).ok()?;
        Some((token, user))
    }

    fn clear(&self) -> Result<(), StorageError> {
        for path in [self.token_path(), self.user_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
