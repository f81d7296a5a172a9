//! CORS origin policy
//!
//! Every response, including errors and preflight, carries CORS headers.
//! The allow-origin value reflects the request's `Origin` only when its
//! hostname is the configured base domain, a subdomain of it, or a
//! loopback host; anything else gets the fixed canonical origin instead.
//! Disallowed origins therefore never see their own value reflected back.
//!
//! tower-http's `CorsLayer` expresses allow-lists but not this
//! reflect-or-fallback behavior, so the policy is applied by a small
//! middleware instead.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::Url;

use crate::state::AppState;

/// Origin reflection policy for one deployment.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    /// Base domain whose subdomains are allowed (e.g. "sanjaysingh.net")
    base_domain: String,
    /// Canonical origin returned for disallowed or absent origins
    fallback_origin: String,
}

impl CorsPolicy {
    pub fn new(base_domain: impl Into<String>, fallback_origin: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            fallback_origin: fallback_origin.into(),
        }
    }

    /// Whether an origin's hostname falls inside the allowed set.
    fn is_allowed(&self, origin: &str) -> bool {
        let Ok(url) = Url::parse(origin) else {
            tracing::warn!(origin = %origin, "Invalid origin URL");
            return false;
        };

        let Some(hostname) = url.host_str() else {
            return false;
        };

        if hostname == self.base_domain
            || hostname
                .strip_suffix(&self.base_domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
        {
            return true;
        }

        // Loopback hosts allowed for development, any port
        hostname == "localhost" || hostname == "127.0.0.1"
    }

    /// Resolve the `Access-Control-Allow-Origin` value for a request.
    pub fn allow_origin(&self, origin: Option<&str>) -> String {
        match origin {
            Some(origin) if self.is_allowed(origin) => origin.to_string(),
            _ => self.fallback_origin.clone(),
        }
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: &str) {
    // The reflected value already round-tripped through header parsing;
    // a fallback origin that is not a valid header value is a config bug
    // and simply omits the header.
    if let Ok(value) = HeaderValue::from_str(allow_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

/// Middleware wrapping the whole router: short-circuits preflight to 204
/// and stamps CORS headers onto every other response.
pub async fn cors_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let allow_origin = state.cors.allow_origin(origin.as_deref());

    if req.method() == Method::OPTIONS {
        tracing::debug!(origin = ?origin, "Handling CORS preflight request");
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut(), &allow_origin);
        return response;
    }

    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut(), &allow_origin);
    response
}
