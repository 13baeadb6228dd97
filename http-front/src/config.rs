//! Configuration for the MCP HTTP front server.

use serde::Deserialize;

/// Configuration for the HTTP front
#[derive(Clone, Debug, Deserialize)]
pub struct HttpFrontConfig {
    /// Server bind address
    pub bind_addr: String,
    /// Base URL override for the session-server binding. When unset, the
    /// base URL is detected from the first request's scheme and host, which
    /// is only reliable for single-origin deployments.
    pub base_url: Option<String>,
    /// JSON body size limit in bytes
    pub max_body_bytes: usize,
}

impl Default for HttpFrontConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            base_url: None,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl HttpFrontConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("MCP_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            base_url: std::env::var("MCP_BASE_URL").ok(),
            max_body_bytes: std::env::var("MCP_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2 * 1024 * 1024),
        }
    }
}
