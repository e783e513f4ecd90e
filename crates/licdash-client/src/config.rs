//! API client configuration.

use std::time::Duration;

/// Default API base when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/backend_api";

/// License API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
