//! Platform authenticator seam
//!
//! The WebAuthn ceremony itself belongs to the platform (browser, OS
//! keychain, security key); the session manager only shuttles opaque
//! ceremony options to it and the resulting credential back to the
//! authority. The `PlatformAuthenticator` trait is that seam, which also
//! makes ceremonies mockable in tests.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// Failure causes a platform authenticator can report, as a closed enum
/// (the WebAuthn `DOMException` names, minus the string typing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// User dismissed the prompt (NotAllowedError)
    Cancelled,
    /// Origin/RP mismatch or similar (SecurityError)
    Security,
    /// Platform cannot do passkeys (NotSupportedError)
    Unsupported,
    /// Credential already exists, or none exists (InvalidStateError)
    InvalidState,
    /// Authenticator cannot satisfy the options (ConstraintError)
    Constraint,
    /// Ceremony was aborted (AbortError)
    Aborted,
    /// Anything else, with the platform's own message
    Other(String),
}

/// Identifier of a platform credential.
///
/// Platforms hand these out either as text (already base64url) or as raw
/// bytes; the wire protocol is JSON-only, so raw ids are normalized to
/// URL-safe unpadded base64 before transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialId {
    Text(String),
    Raw(Vec<u8>),
}

impl CredentialId {
    /// The wire form of this id.
    pub fn to_base64url(&self) -> String {
        match self {
            CredentialId::Text(id) => id.clone(),
            CredentialId::Raw(bytes) => URL_SAFE_NO_PAD.encode(bytes),
        }
    }
}

/// A credential produced by a ceremony, ready for the authority's
/// completion endpoint.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CredentialId,
    /// The rest of the platform's response, passed through untouched
    pub response: Value,
}

impl Credential {
    /// JSON payload for `/auth/*/complete`: the platform response with the
    /// id normalized to its text form.
    pub fn into_wire(self) -> Value {
        let mut wire = match self.response {
            Value::Object(map) => Value::Object(map),
            other => serde_json::json!({ "response": other }),
        };
        if let Value::Object(map) = &mut wire {
            map.insert("id".to_string(), Value::String(self.id.to_base64url()));
        }
        wire
    }
}

/// Driver for the platform's passkey capability.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the platform can run passkey ceremonies at all.
    fn is_supported(&self) -> bool;

    /// Run a registration ceremony from the authority's creation options.
    async fn create_credential(&self, options: &Value) -> Result<Credential, AuthenticatorError>;

    /// Run an authentication ceremony from the authority's request
    /// options. Usernameless: the platform selects the credential.
    async fn get_credential(&self, options: &Value) -> Result<Credential, AuthenticatorError>;
}
