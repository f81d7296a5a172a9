//! Session error types
//!
//! The original browser module switched on duck-typed `error.name` strings;
//! here every failure cause is a closed enum variant, mapped once to its
//! user-facing text.

use thiserror::Error;

use crate::authenticator::AuthenticatorError;

/// Which ceremony a failure happened in. Several authenticator errors read
/// differently for registration and login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Login,
}

/// Errors surfaced by the session manager.
#[derive(Debug, Error)]
pub enum SessionError {
    /// register() called with an empty username
    #[error("Username is required for registration")]
    UsernameRequired,

    /// The platform lacks passkey capability
    #[error("Passkeys are not supported on this device")]
    Unsupported,

    /// The platform authenticator failed during a ceremony
    #[error("{}", user_message(error, *during))]
    Authenticator {
        error: AuthenticatorError,
        during: CeremonyKind,
    },

    /// The authority completed the ceremony but did not verify it
    #[error("{}", match during {
        CeremonyKind::Registration => "Registration was not verified",
        CeremonyKind::Login => "Authentication was not verified",
    })]
    NotVerified { during: CeremonyKind },

    /// The authority rejected a begin/complete request
    #[error("{message}")]
    Authority { status: u16, message: String },

    /// An authenticated call was attempted with no session held
    #[error("No authentication token available")]
    NoSession,

    /// A 401 on an authenticated call; the local session has been cleared
    #[error("Session expired")]
    SessionExpired,

    /// The todo API rejected a request (non-401)
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl SessionError {
    /// True only for the expiry signal, which callers must treat as a
    /// trigger to re-render the unauthenticated state rather than as a
    /// displayable error.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SessionError::SessionExpired)
    }
}

/// User-facing text for a platform authenticator failure.
fn user_message(error: &AuthenticatorError, during: CeremonyKind) -> String {
    let registration = during == CeremonyKind::Registration;
    match error {
        AuthenticatorError::Cancelled => {
            if registration {
                "Passkey creation cancelled".to_string()
            } else {
                "Passkey login cancelled".to_string()
            }
        }
        AuthenticatorError::Security => "Security error".to_string(),
        AuthenticatorError::Unsupported => "Passkeys not supported".to_string(),
        AuthenticatorError::InvalidState => {
            if registration {
                "A passkey already exists. Try logging in".to_string()
            } else {
                "No passkeys found. Register first".to_string()
            }
        }
        AuthenticatorError::Constraint => "Device not compatible".to_string(),
        AuthenticatorError::Aborted => "Operation cancelled".to_string(),
        AuthenticatorError::Other(message) => {
            if message.is_empty() {
                if registration {
                    "Registration failed".to_string()
                } else {
                    "Login failed".to_string()
                }
            } else {
                message.clone()
            }
        }
    }
}
