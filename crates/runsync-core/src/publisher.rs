//! Test run publisher: run creation, batched result submission, completion.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::attachment::AttachmentUploader;
use crate::batch::Batcher;
use crate::cancel::CancelToken;
use crate::config::PublisherConfig;
use crate::error::{PublishError, PublishResult, ServiceError};
use crate::ingest::ResultReader;
use crate::lifecycle::PublishSession;
use crate::model::{RemoteRunHandle, ResultData, ResultId, RunContext, RunData, RunUpdateModel};
use crate::service::RunsService;

/// How run-level attachments are published when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunAttachmentMode {
    /// One upload per file, each classified by name.
    #[default]
    Individual,
    /// One `TestResults_{run_id}.zip` upload holding every file.
    Archive,
}

/// Publishes test runs to a [`RunsService`].
///
/// `start` and `end` are single-call operations: the publisher keeps no
/// per-run state, so calling `end` twice sends two completion updates. Use
/// [`PublishSession`] to have the lifecycle order enforced.
#[derive(Clone)]
pub struct TestRunPublisher {
    service: Arc<dyn RunsService>,
    reader: Arc<dyn ResultReader>,
    config: PublisherConfig,
    batcher: Batcher,
    uploader: AttachmentUploader,
    cancel: CancelToken,
}

impl TestRunPublisher {
    pub fn new(
        service: Arc<dyn RunsService>,
        reader: Arc<dyn ResultReader>,
        config: PublisherConfig,
    ) -> Self {
        Self::with_cancel(service, reader, config, CancelToken::never())
    }

    /// Create a publisher whose remote calls abort when `cancel` fires.
    pub fn with_cancel(
        service: Arc<dyn RunsService>,
        reader: Arc<dyn ResultReader>,
        config: PublisherConfig,
        cancel: CancelToken,
    ) -> Self {
        let uploader = AttachmentUploader::new(Arc::clone(&service), &config, cancel.clone());
        Self {
            service,
            reader,
            config,
            batcher: Batcher::default(),
            uploader,
            cancel,
        }
    }

    pub fn project(&self) -> &str {
        &self.config.project
    }

    pub fn uploader(&self) -> &AttachmentUploader {
        &self.uploader
    }

    /// Parse a results file with the configured reader.
    ///
    /// When `run_name` is given it is stamped onto `context` before the
    /// reader sees it.
    pub fn read_results_from_file(
        &self,
        context: &mut RunContext,
        path: impl AsRef<Path>,
        run_name: Option<&str>,
    ) -> PublishResult<RunData> {
        let path = path.as_ref();
        if let Some(name) = run_name {
            context.run_name = Some(name.to_string());
        }

        debug!(path = %path.display(), run_name = ?context.run_name, "reading results");
        self.reader
            .read_results(context, path)
            .map_err(|source| PublishError::Ingestion {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Create the remote run.
    pub async fn start(&self, run: &RunData) -> PublishResult<RemoteRunHandle> {
        if run.name.is_empty() {
            return Err(PublishError::RunCreateFailed {
                reason: "run name is empty".to_string(),
                source: None,
            });
        }

        let handle = self
            .cancel
            .run(self.service.create_run(&self.config.project, run))
            .await
            .map_err(|_| PublishError::Canceled)?
            .map_err(|source| PublishError::RunCreateFailed {
                reason: format!("project {}", self.config.project),
                source: Some(source),
            })?;

        info!(run_id = handle.id, name = %handle.name, project = %self.config.project, "test run created");
        Ok(handle)
    }

    /// Submit results in order, in batches, then upload their attachments.
    ///
    /// Returns the remote result ids in the same order as `results`.
    pub async fn add_results(
        &self,
        handle: &RemoteRunHandle,
        results: &[ResultData],
    ) -> PublishResult<Vec<ResultId>> {
        let run_id = handle.id;
        let total_chunks = self.batcher.batch_count(results.len());
        let mut ids = Vec::with_capacity(results.len());
        let mut attachments = 0;

        for batch in self.batcher.batches(results) {
            debug!(
                run_id,
                batch = batch.index,
                offset = batch.offset,
                size = batch.items.len(),
                "submitting result batch"
            );

            let submission_failed = |source: ServiceError| PublishError::ResultSubmissionFailed {
                run_id,
                chunks_submitted: batch.index,
                total_chunks,
                source,
            };

            let batch_ids = self
                .cancel
                .run(
                    self.service
                        .add_results(batch.items, &self.config.project, run_id),
                )
                .await
                .map_err(|_| PublishError::Canceled)?
                .map_err(submission_failed)?;

            if batch_ids.len() != batch.items.len() {
                return Err(submission_failed(ServiceError::InvalidResponse {
                    message: format!(
                        "expected {} result ids, got {}",
                        batch.items.len(),
                        batch_ids.len()
                    ),
                }));
            }

            let pairs: Vec<(&ResultData, ResultId)> =
                batch.items.iter().zip(batch_ids.iter().copied()).collect();
            attachments += self.uploader.upload_batch_attachments(run_id, &pairs).await?;
            ids.extend(batch_ids);
        }

        info!(
            run_id,
            results = results.len(),
            batches = total_chunks,
            attachments,
            "test results published"
        );
        Ok(ids)
    }

    /// Mark the run completed and publish its run-level attachments.
    ///
    /// Attachments are only uploaded after the completion update succeeded.
    /// A failed upload does not undo the completion.
    pub async fn end(
        &self,
        run: &RunData,
        handle: &RemoteRunHandle,
        mode: RunAttachmentMode,
    ) -> PublishResult<()> {
        self.complete_run(run, handle).await?;
        self.publish_run_attachments(run, handle, mode).await?;
        Ok(())
    }

    /// Send the `Completed` state update for the run.
    pub async fn complete_run(&self, run: &RunData, handle: &RemoteRunHandle) -> PublishResult<()> {
        let run_id = handle.id;
        let update = RunUpdateModel::completed(Some(run.completed_date.unwrap_or_else(Utc::now)));

        self.cancel
            .run(
                self.service
                    .update_run(&self.config.project, run_id, &update),
            )
            .await
            .map_err(|_| PublishError::Canceled)?
            .map_err(|source| PublishError::RunUpdateFailed { run_id, source })?;

        info!(run_id, state = %update.state, "test run completed");
        Ok(())
    }

    /// Upload the run's own attachments. Returns the number of uploads made.
    pub async fn publish_run_attachments(
        &self,
        run: &RunData,
        handle: &RemoteRunHandle,
        mode: RunAttachmentMode,
    ) -> PublishResult<usize> {
        let run_id = handle.id;
        let uploaded = match mode {
            RunAttachmentMode::Individual => {
                self.uploader
                    .upload_run_attachments(run_id, &run.attachments)
                    .await?
            }
            RunAttachmentMode::Archive => {
                self.uploader
                    .upload_run_archive(run_id, &run.attachments)
                    .await?
            }
        };

        debug!(run_id, uploaded, mode = ?mode, "run attachments published");
        Ok(uploaded)
    }

    /// Begin a lifecycle-checked session for `run`.
    pub fn session(&self, run: RunData) -> PublishSession<'_> {
        PublishSession::new(self, run)
    }
}
