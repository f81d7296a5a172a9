//! Bearer authentication module
//!
//! Provides the `AuthenticatedUser` extractor for axum handlers. Tokens are
//! opaque to this service: every request forwards its bearer token to the
//! external authentication authority's `/auth/verify` endpoint, and only a
//! successful response with `valid: true` establishes an identity. Any
//! other outcome, including a network failure, is treated as an invalid
//! token (fail-closed).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use todo_types::{User, VerifyResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity bound by a verified bearer token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub user_id: String,
    pub user: Option<User>,
}

/// Client for the external authentication authority.
pub struct AuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl AuthClient {
    /// Create a client for the authority at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Verify a bearer token with the authority.
    ///
    /// Returns `None` on any verification failure: non-success status,
    /// unreachable authority, unparseable body, or `valid: false`.
    pub async fn verify(&self, token: &str) -> Option<VerifiedIdentity> {
        let url = format!("{}/auth/verify", self.base_url);

        let response = match self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, auth_service_url = %self.base_url, "Auth service verification error");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                auth_service_url = %self.base_url,
                "Auth service verification failed"
            );
            return None;
        }

        let result: VerifyResponse = match response.json().await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse auth service response");
                return None;
            }
        };

        if !result.valid {
            tracing::warn!("Auth service rejected token as invalid");
            return None;
        }

        let user_id = result.user_id?;
        tracing::info!(user_id = %user_id, "Auth service verification completed");

        Some(VerifiedIdentity {
            user_id,
            user: result.user,
        })
    }
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::auth_error("AUTH_MISSING_TOKEN", "Missing or invalid token"))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| ApiError::auth_error("AUTH_MISSING_TOKEN", "Missing or invalid token"))?;

    auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::auth_error("AUTH_MISSING_TOKEN", "Missing or invalid token"))
}

/// Authenticated user extractor: the single gate in front of every
/// protected route.
///
/// The extractor:
/// 1. Reads the `Authorization: Bearer <token>` header
/// 2. Forwards the token to the authority's `/auth/verify` endpoint
/// 3. Binds the verified `user_id` for the rest of the request
///
/// Handlers behind it derive all storage keys from `user_id`, never from
/// client-supplied identifiers. Returns 401 on any failure.
pub struct AuthenticatedUser {
    pub user_id: String,
    pub user: Option<User>,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let identity = state
            .auth
            .verify(token)
            .await
            .ok_or_else(|| ApiError::auth_error("AUTH_INVALID_TOKEN", "Invalid token"))?;

        Ok(AuthenticatedUser {
            user_id: identity.user_id,
            user: identity.user,
        })
    }
}
