//! Todo Server Library - stateless per-user todo API behind passkey auth
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod repo;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AuthClient, AuthenticatedUser, VerifiedIdentity};
pub use config::Config;
pub use cors::CorsPolicy;
pub use error::ApiError;
pub use repo::TodoRepository;
pub use routes::create_router;
pub use state::AppState;
pub use store::{KvStore, MemoryKvStore, PostgresKvStore, StoreError};
