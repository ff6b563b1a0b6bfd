//! Publisher configuration.

use serde::{Deserialize, Serialize};

/// Largest base64 attachment payload the service accepts (100 MiB).
pub const MAX_ATTACHMENT_CONTENT_LEN: usize = 100 * 1024 * 1024;

/// Publisher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Project the runs belong to.
    #[serde(default)]
    pub project: String,

    /// How many results may upload their attachments at the same time.
    #[serde(default = "default_attachment_concurrency")]
    pub attachment_concurrency: usize,

    /// Attachments whose encoded content exceeds this are skipped.
    #[serde(default = "default_max_attachment_content_len")]
    pub max_attachment_content_len: usize,
}

fn default_attachment_concurrency() -> usize {
    1
}

fn default_max_attachment_content_len() -> usize {
    MAX_ATTACHMENT_CONTENT_LEN
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            attachment_concurrency: default_attachment_concurrency(),
            max_attachment_content_len: default_max_attachment_content_len(),
        }
    }
}

impl PublisherConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self::default().with_project(project)
    }

    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `RUNSYNC_PROJECT` | Project name or id |
    /// | `RUNSYNC_ATTACHMENT_CONCURRENCY` | Parallel result attachment uploads (default: 1) |
    /// | `RUNSYNC_MAX_ATTACHMENT_BYTES` | Max encoded attachment size (default: 100 MiB) |
    pub fn from_env() -> Self {
        Self {
            project: std::env::var("RUNSYNC_PROJECT").unwrap_or_default(),
            attachment_concurrency: std::env::var("RUNSYNC_ATTACHMENT_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or_else(default_attachment_concurrency),
            max_attachment_content_len: std::env::var("RUNSYNC_MAX_ATTACHMENT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_attachment_content_len),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Values below 1 are treated as 1.
    pub fn with_attachment_concurrency(mut self, concurrency: usize) -> Self {
        self.attachment_concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_attachment_content_len(mut self, len: usize) -> Self {
        self.max_attachment_content_len = len;
        self
    }
}
