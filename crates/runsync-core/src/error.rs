//! Error types for the publishing pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::RunId;

/// Failure reported by a [`RunsService`](crate::service::RunsService) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Authentication failed or token invalid.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Project, run or result does not exist on the service.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The service refused the request payload.
    #[error("rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service failed while handling the request.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The service binding itself is misconfigured.
    #[error("misconfigured: {message}")]
    Misconfigured { message: String },
}

impl ServiceError {
    /// Whether the error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Network { .. }
        )
    }
}

/// Result type for remote service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Why a single attachment could not be published.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("failed to read attachment")]
    Io(#[from] std::io::Error),

    #[error("failed to build archive")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors surfaced by the publisher to its caller.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The result reader could not produce a run.
    #[error("failed to read results from {}", .path.display())]
    Ingestion {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create test run: {reason}")]
    RunCreateFailed {
        reason: String,
        #[source]
        source: Option<ServiceError>,
    },

    #[error("failed to update test run {run_id}")]
    RunUpdateFailed {
        run_id: RunId,
        #[source]
        source: ServiceError,
    },

    /// A chunk submission failed; earlier chunks remain published.
    #[error(
        "failed to submit results to run {run_id} ({chunks_submitted}/{total_chunks} batches published)"
    )]
    ResultSubmissionFailed {
        run_id: RunId,
        chunks_submitted: usize,
        total_chunks: usize,
        #[source]
        source: ServiceError,
    },

    #[error("failed to upload attachment {file_name} to run {run_id}")]
    AttachmentUploadFailed {
        run_id: RunId,
        file_name: String,
        #[source]
        source: AttachmentError,
    },

    #[error("operation canceled")]
    Canceled,

    /// A session operation was called in the wrong lifecycle state.
    #[error("cannot {operation} a run that is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl PublishError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Result type for publisher operations.
pub type PublishResult<T> = Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ServiceError::Network {
            message: "reset".into()
        }
        .is_retryable());
        assert!(ServiceError::Server {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ServiceError::Rejected {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!ServiceError::Unauthorized {
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn submission_failure_reports_progress() {
        let err = PublishError::ResultSubmissionFailed {
            run_id: 7,
            chunks_submitted: 2,
            total_chunks: 5,
            source: ServiceError::Network {
                message: "reset".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to submit results to run 7 (2/5 batches published)"
        );
    }
}
