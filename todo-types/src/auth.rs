//! Types of the authentication authority contract.
//!
//! The authority itself is an external service; these are the payloads the
//! todo system exchanges with it over `/auth/register/*`, `/auth/login/*`
//! and `/auth/verify`.

use serde::{Deserialize, Serialize};

/// Identity established by a passkey ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// Body of `POST /auth/register/begin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterBeginRequest {
    pub username: String,
}

/// Result of `POST /auth/register/complete` and `POST /auth/login/complete`.
///
/// `token` and `user` are only present when `verified` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CeremonyResult {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Result of `POST /auth/verify`.
///
/// A `valid: false` response is a verification failure even when the HTTP
/// status is 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_response_uses_camel_case_user_id() {
        let parsed: VerifyResponse =
            serde_json::from_str(r#"{"valid":true,"userId":"u1","user":{"id":"u1","username":"alice"}}"#)
                .unwrap();
        assert!(parsed.valid);
        assert_eq!(parsed.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn verify_response_defaults_to_invalid() {
        let parsed: VerifyResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.valid);
        assert!(parsed.user_id.is_none());
    }
}
