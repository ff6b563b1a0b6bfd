//! Remote test-management service capability.

use async_trait::async_trait;

use crate::attachment::AttachmentRequest;
use crate::error::ServiceResult;
use crate::model::{RemoteRunHandle, ResultData, ResultId, RunData, RunId, RunUpdateModel};

/// Operations the publisher needs from the test-management service.
///
/// Implementations own transport, authentication and any retry policy. The
/// publisher never retries on its own.
#[async_trait]
pub trait RunsService: Send + Sync {
    /// Create a run and return its handle.
    async fn create_run(&self, project: &str, run: &RunData) -> ServiceResult<RemoteRunHandle>;

    async fn update_run(
        &self,
        project: &str,
        run_id: RunId,
        update: &RunUpdateModel,
    ) -> ServiceResult<()>;

    /// Add results to a run.
    ///
    /// Must return exactly one identifier per submitted result, in the order
    /// the results were given.
    async fn add_results(
        &self,
        results: &[ResultData],
        project: &str,
        run_id: RunId,
    ) -> ServiceResult<Vec<ResultId>>;

    async fn create_run_attachment(
        &self,
        attachment: &AttachmentRequest,
        project: &str,
        run_id: RunId,
    ) -> ServiceResult<()>;

    async fn create_result_attachment(
        &self,
        attachment: &AttachmentRequest,
        project: &str,
        run_id: RunId,
        result_id: ResultId,
    ) -> ServiceResult<()>;
}
