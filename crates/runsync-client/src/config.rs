//! Client configuration.

use serde::{Deserialize, Serialize};

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Collection URL; project paths are appended to it.
    #[serde(default = "default_url")]
    pub url: String,

    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    100
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `RUNSYNC_URL` | Collection URL |
    /// | `RUNSYNC_TOKEN` | Bearer token |
    /// | `RUNSYNC_TIMEOUT` | Request timeout in seconds (default: 100) |
    /// | `RUNSYNC_MAX_RETRIES` | Max retries for transient failures (default: 3) |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("RUNSYNC_URL").unwrap_or_else(|_| default_url()),
            token: std::env::var("RUNSYNC_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout_secs: std::env::var("RUNSYNC_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            max_retries: std::env::var("RUNSYNC_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_retries),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
