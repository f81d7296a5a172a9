//! Todo Client Library - passkey session management for the todo service
//!
//! Provides the session manager (register/login/logout/restore and the
//! bearer-wrapped request helper) plus a typed client for the todo API.
//! The platform authenticator and durable storage sit behind traits so
//! embedders supply their own and tests can mock both.

pub mod api;
pub mod authenticator;
pub mod error;
pub mod session;
pub mod storage;

pub use api::TodoApi;
pub use authenticator::{AuthenticatorError, Credential, CredentialId, PlatformAuthenticator};
pub use error::{CeremonyKind, SessionError};
pub use session::{AuthOutcome, AuthState, Session, SessionManager};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore, StorageError};
