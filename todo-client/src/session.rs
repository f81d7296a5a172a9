//! Session manager
//!
//! Owns the bearer token and current user identity, and is the single
//! choke point for every authenticated call. The register/login/logout/
//! restore protocol matches the authority contract:
//!
//! - register: `/auth/register/begin` -> platform ceremony -> `/auth/register/complete`
//! - login: the usernameless twin over `/auth/login/*`
//! - restore: revalidate a persisted token with a lightweight GET
//! - any 401 on an authenticated call clears the session locally
//!
//! Ceremony methods take `&mut self`, so register/login/logout are
//! mutually exclusive on one session object.

use std::sync::Arc;

use serde_json::Value;

use todo_types::{CeremonyResult, RegisterBeginRequest, User};

use crate::authenticator::PlatformAuthenticator;
use crate::error::{CeremonyKind, SessionError};
use crate::storage::SessionStore;

/// The client-held pairing of a bearer token and user identity.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Snapshot of the current authentication state.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
}

impl AuthState {
    fn logged_out() -> Self {
        Self {
            authenticated: false,
            user: None,
            token: None,
        }
    }
}

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub message: String,
}

/// Owns authentication state and wraps outbound requests with the bearer
/// header.
pub struct SessionManager {
    auth_service_url: String,
    http: reqwest::Client,
    authenticator: Arc<dyn PlatformAuthenticator>,
    store: Box<dyn SessionStore>,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(
        auth_service_url: impl Into<String>,
        authenticator: Arc<dyn PlatformAuthenticator>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            auth_service_url: auth_service_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            authenticator,
            store,
            session: None,
        }
    }

    /// Current state without touching the network.
    pub fn auth_state(&self) -> AuthState {
        match &self.session {
            Some(session) => AuthState {
                authenticated: true,
                user: Some(session.user.clone()),
                token: Some(session.token.clone()),
            },
            None => AuthState::logged_out(),
        }
    }

    /// Register a new passkey for `username` and establish a session.
    pub async fn register(&mut self, username: &str) -> Result<AuthOutcome, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::UsernameRequired);
        }
        if !self.authenticator.is_supported() {
            return Err(SessionError::Unsupported);
        }

        let options = self
            .begin_ceremony(
                "/auth/register/begin",
                serde_json::to_value(RegisterBeginRequest {
                    username: username.to_string(),
                })
                .unwrap_or(Value::Null),
            )
            .await?;

        let credential = self
            .authenticator
            .create_credential(&options)
            .await
            .map_err(|error| SessionError::Authenticator {
                error,
                during: CeremonyKind::Registration,
            })?;

        let result = self
            .complete_ceremony("/auth/register/complete", credential.into_wire())
            .await?;

        let user = self.establish(result, CeremonyKind::Registration)?;
        tracing::info!(username = %user.username, "Registration successful");

        Ok(AuthOutcome {
            user,
            message: "Registration successful!".to_string(),
        })
    }

    /// Usernameless login: the platform authenticator selects the
    /// credential, no identity hint goes to the authority.
    pub async fn login(&mut self) -> Result<AuthOutcome, SessionError> {
        if !self.authenticator.is_supported() {
            return Err(SessionError::Unsupported);
        }

        let options = self
            .begin_ceremony("/auth/login/begin", serde_json::json!({}))
            .await?;

        let credential = self
            .authenticator
            .get_credential(&options)
            .await
            .map_err(|error| SessionError::Authenticator {
                error,
                during: CeremonyKind::Login,
            })?;

        let result = self
            .complete_ceremony("/auth/login/complete", credential.into_wire())
            .await?;

        let user = self.establish(result, CeremonyKind::Login)?;
        tracing::info!(username = %user.username, "Login successful");

        let message = format!("Welcome back, {}!", user.username);
        Ok(AuthOutcome { user, message })
    }

    /// Clear the session, in memory and in durable storage. Idempotent.
    pub fn logout(&mut self) {
        self.session = None;
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear session storage");
        }
    }

    /// Restore a persisted session at startup.
    ///
    /// A persisted token is revalidated with an authenticated GET against
    /// `validation_url`; any non-401 response counts as valid, while a 401
    /// or a network failure invalidates it (fail-closed) and clears
    /// storage. This is the only path that silently downgrades a stale
    /// session to a clean logged-out state.
    pub async fn restore(&mut self, validation_url: &str) -> AuthState {
        let Some((token, user)) = self.store.load() else {
            return AuthState::logged_out();
        };

        tracing::debug!("Found saved session, validating token");
        let valid = match self
            .http
            .get(validation_url)
            .bearer_auth(&token)
            .send()
            .await
        {
            Ok(response) => response.status() != reqwest::StatusCode::UNAUTHORIZED,
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed");
                false
            }
        };

        if valid {
            tracing::info!(username = %user.username, "Session restored");
            self.session = Some(Session {
                token,
                user,
            });
            self.auth_state()
        } else {
            tracing::info!("Saved token is invalid, clearing storage");
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "Failed to clear session storage");
            }
            AuthState::logged_out()
        }
    }

    /// Issue a request with the bearer header attached.
    ///
    /// Fails fast with `NoSession` when no token is held. A 401 response
    /// is the session-expiry signal: the local session is cleared
    /// immediately and the call fails with `SessionExpired`, which callers
    /// must treat as "re-authenticate", not as a generic error.
    pub async fn authenticated_request(
        &mut self,
        method: reqwest::Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, SessionError> {
        let token = self
            .session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(SessionError::NoSession)?;

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Token expired or invalid, logging out");
            self.logout();
            return Err(SessionError::SessionExpired);
        }

        Ok(response)
    }

    async fn begin_ceremony(&self, path: &str, body: Value) -> Result<Value, SessionError> {
        let url = format!("{}{}", self.auth_service_url, path);
        let response = self.http.post(&url).json(&body).send().await?;
        self.decode_or_authority_error(response).await
    }

    async fn complete_ceremony(
        &self,
        path: &str,
        credential: Value,
    ) -> Result<CeremonyResult, SessionError> {
        let url = format!("{}{}", self.auth_service_url, path);
        let response = self.http.post(&url).json(&credential).send().await?;
        let value: Value = self.decode_or_authority_error(response).await?;
        serde_json::from_value(value).map_err(|e| SessionError::Authority {
            status: 200,
            message: format!("Malformed ceremony result: {}", e),
        })
    }

    /// On success decode the JSON body; otherwise surface the authority's
    /// own `{error}` message when it sent one.
    async fn decode_or_authority_error(
        &self,
        response: reqwest::Response,
    ) -> Result<Value, SessionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| format!("Authentication service error ({})", status));

        Err(SessionError::Authority {
            status: status.as_u16(),
            message,
        })
    }

    /// Store a verified ceremony result as the active session.
    fn establish(
        &mut self,
        result: CeremonyResult,
        during: CeremonyKind,
    ) -> Result<User, SessionError> {
        if !result.verified {
            return Err(SessionError::NotVerified { during });
        }
        let (Some(token), Some(user)) = (result.token, result.user) else {
            return Err(SessionError::NotVerified { during });
        };

        if let Err(e) = self.store.save(&token, &user) {
            // Session still works for this run; it just won't survive a restart.
            tracing::warn!(error = %e, "Failed to persist session");
        }
        self.session = Some(Session {
            token,
            user: user.clone(),
        });
        Ok(user)
    }
}
