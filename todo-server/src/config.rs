//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Base URL of the authentication authority
    pub auth_service_url: String,
    /// Database URL for the persistent key-value store; memory fallback when unset
    pub database_url: Option<String>,
    /// Base domain whose subdomains may have their origin reflected
    pub cors_base_domain: String,
    /// Canonical origin returned for disallowed origins
    pub cors_fallback_origin: String,
    /// Request body limit in MB (default: 1)
    pub body_limit_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            auth_service_url: "https://authservice.sanjaysingh.net".to_string(),
            database_url: None,
            cors_base_domain: "sanjaysingh.net".to_string(),
            cors_fallback_origin: "https://sanjaysingh.net".to_string(),
            body_limit_mb: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let auth_service_url = std::env::var("AUTH_SERVICE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.auth_service_url);

        let database_url = std::env::var("DATABASE_URL").ok();

        let cors_base_domain = std::env::var("CORS_BASE_DOMAIN")
            .ok()
            .unwrap_or(defaults.cors_base_domain);

        let cors_fallback_origin = std::env::var("CORS_FALLBACK_ORIGIN")
            .ok()
            .unwrap_or(defaults.cors_fallback_origin);

        let body_limit_mb = std::env::var("BODY_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.body_limit_mb);

        Self {
            port,
            host,
            auth_service_url,
            database_url,
            cors_base_domain,
            cors_fallback_origin,
            body_limit_mb,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_loopback() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn default_cors_fallback_is_the_base_domain_origin() {
        let config = Config::default();
        assert_eq!(config.cors_fallback_origin, "https://sanjaysingh.net");
        assert_eq!(config.cors_base_domain, "sanjaysingh.net");
    }
}
