//! Process exit codes.
//! These codes are part of the public contract; scripts branch on them.

use runsync_core::PublishError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 1; // Unreadable results file, bad flags or client config
pub const EXIT_RUN_FAILED: i32 = 2; // Run could not be created or completed
pub const EXIT_SUBMISSION_FAILED: i32 = 3; // A result batch was not accepted
pub const EXIT_ATTACHMENT_FAILED: i32 = 4; // An attachment upload failed
pub const EXIT_CANCELED: i32 = 130; // Interrupted (SIGINT)

pub fn for_publish_error(err: &PublishError) -> i32 {
    match err {
        PublishError::Ingestion { .. } | PublishError::InvalidState { .. } => EXIT_CONFIG_ERROR,
        PublishError::RunCreateFailed { .. } | PublishError::RunUpdateFailed { .. } => {
            EXIT_RUN_FAILED
        }
        PublishError::ResultSubmissionFailed { .. } => EXIT_SUBMISSION_FAILED,
        PublishError::AttachmentUploadFailed { .. } => EXIT_ATTACHMENT_FAILED,
        PublishError::Canceled => EXIT_CANCELED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runsync_core::{AttachmentError, ServiceError};

    fn service() -> ServiceError {
        ServiceError::Server {
            status: 500,
            message: String::new(),
        }
    }

    #[test]
    fn publish_errors_map_to_contract_codes() {
        let cases = [
            (
                PublishError::Ingestion {
                    path: "r.json".into(),
                    source: anyhow::anyhow!("bad"),
                },
                EXIT_CONFIG_ERROR,
            ),
            (
                PublishError::RunCreateFailed {
                    reason: String::new(),
                    source: None,
                },
                EXIT_RUN_FAILED,
            ),
            (
                PublishError::RunUpdateFailed {
                    run_id: 1,
                    source: service(),
                },
                EXIT_RUN_FAILED,
            ),
            (
                PublishError::ResultSubmissionFailed {
                    run_id: 1,
                    chunks_submitted: 0,
                    total_chunks: 1,
                    source: service(),
                },
                EXIT_SUBMISSION_FAILED,
            ),
            (
                PublishError::AttachmentUploadFailed {
                    run_id: 1,
                    file_name: "a.txt".into(),
                    source: AttachmentError::Service(service()),
                },
                EXIT_ATTACHMENT_FAILED,
            ),
            (
                PublishError::InvalidState {
                    operation: "end",
                    state: "created",
                },
                EXIT_CONFIG_ERROR,
            ),
            (PublishError::Canceled, EXIT_CANCELED),
        ];

        for (err, code) in cases {
            assert_eq!(for_publish_error(&err), code, "{err}");
        }
    }
}
