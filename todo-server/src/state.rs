//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use crate::auth::AuthClient;
use crate::cors::CorsPolicy;
use crate::repo::TodoRepository;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Client for the external authentication authority
    pub auth: Arc<AuthClient>,
    /// Per-user todo storage over the key-value store
    pub repo: TodoRepository,
    /// CORS origin reflection policy
    pub cors: CorsPolicy,
}
