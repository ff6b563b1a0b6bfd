//! Error types for the HTTP client.

use std::time::Duration;

use runsync_core::ServiceError;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Authentication failed or token invalid (401/403).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Project, run or result does not exist (404).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Rate limit exceeded (429).
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Request refused by the service (other 4xx).
    #[error("rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Service failure (5xx).
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Network { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized { message } => Self::Unauthorized { message },
            ClientError::NotFound { url } => Self::NotFound { message: url },
            ClientError::RateLimited { retry_after } => Self::RateLimited { retry_after },
            ClientError::Rejected { status, message } => Self::Rejected { status, message },
            ClientError::Server { status, message } => Self::Server { status, message },
            ClientError::Network { message } => Self::Network { message },
            ClientError::InvalidResponse { message } => Self::InvalidResponse { message },
            ClientError::Config { message } => Self::Misconfigured { message },
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classes() {
        assert!(ClientError::RateLimited { retry_after: None }.is_retryable());
        assert!(ClientError::Server {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Rejected {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Unauthorized {
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn maps_into_service_error() {
        let err: ServiceError = ClientError::Server {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Server { status: 502, .. }));
        assert!(err.is_retryable());

        let err: ServiceError = ClientError::NotFound {
            url: "http://x/runs/9".into(),
        }
        .into();
        assert_eq!(err.to_string(), "not found: http://x/runs/9");
    }

    #[test]
    fn config_error_is_not_retryable() {
        let err: ServiceError = ClientError::Config {
            message: "bad url".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Misconfigured { .. }));
        assert!(!err.is_retryable());
    }
}
