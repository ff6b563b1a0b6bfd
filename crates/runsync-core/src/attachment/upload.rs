//! Attachment upload: file loading, size limits, and linking to runs or results.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use super::{classify, AttachmentKind, AttachmentRequest};
use crate::archive::{archive_file_name, archive_files};
use crate::cancel::CancelToken;
use crate::config::PublisherConfig;
use crate::error::{AttachmentError, PublishError, PublishResult};
use crate::model::{ResultData, ResultId, RunId};
use crate::service::RunsService;

/// Where an attachment is linked on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Run,
    Result(ResultId),
}

/// Builds attachment requests and pushes them to the service.
#[derive(Clone)]
pub struct AttachmentUploader {
    service: Arc<dyn RunsService>,
    project: String,
    max_content_len: usize,
    concurrency: usize,
    cancel: CancelToken,
}

impl AttachmentUploader {
    pub fn new(service: Arc<dyn RunsService>, config: &PublisherConfig, cancel: CancelToken) -> Self {
        Self {
            service,
            project: config.project.clone(),
            max_content_len: config.max_attachment_content_len,
            concurrency: config.attachment_concurrency.max(1),
            cancel,
        }
    }

    /// Load `path` into a classified request.
    ///
    /// Returns `Ok(None)` when the file does not exist or its encoded content
    /// would exceed the configured limit.
    pub async fn request_for_file(
        &self,
        path: &Path,
    ) -> Result<Option<AttachmentRequest>, AttachmentError> {
        if !self.is_uploadable(path).await? {
            return Ok(None);
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Some(AttachmentRequest::from_bytes(
            classify(path),
            display_name(path),
            &bytes,
        )))
    }

    /// Upload each run-level file individually. Returns the number uploaded.
    pub async fn upload_run_attachments(
        &self,
        run_id: RunId,
        files: &[PathBuf],
    ) -> PublishResult<usize> {
        debug!(run_id, count = files.len(), "uploading run attachments individually");
        let mut uploaded = 0;
        for path in files {
            if self.upload_file(run_id, Target::Run, path).await? {
                uploaded += 1;
            }
        }
        Ok(uploaded)
    }

    /// Bundle run-level files into `TestResults_{run_id}.zip` and upload it once.
    ///
    /// Returns 0 when none of the files exist.
    pub async fn upload_run_archive(&self, run_id: RunId, files: &[PathBuf]) -> PublishResult<usize> {
        let file_name = archive_file_name(run_id);

        let mut present = Vec::with_capacity(files.len());
        for path in files {
            let uploadable = self
                .is_uploadable(path)
                .await
                .map_err(|source| upload_failed(run_id, display_name(path), source))?;
            if uploadable {
                present.push(path.clone());
            }
        }

        if present.is_empty() {
            debug!(run_id, "no run attachments to archive");
            return Ok(0);
        }

        debug!(run_id, count = present.len(), archive = %file_name, "archiving run attachments");
        let bytes = tokio::task::spawn_blocking(move || archive_files(&present))
            .await
            .map_err(|e| upload_failed(run_id, file_name.clone(), std::io::Error::other(e).into()))?
            .map_err(|source| upload_failed(run_id, file_name.clone(), source))?;

        if exceeds(bytes.len(), self.max_content_len) {
            warn!(run_id, archive = %file_name, bytes = bytes.len(), "archive exceeds maximum attachment size, skipping");
            return Ok(0);
        }

        let request = AttachmentRequest::from_bytes(AttachmentKind::General, file_name, &bytes);
        self.send(run_id, Target::Run, &request).await?;
        Ok(1)
    }

    /// Upload one result's file attachments, then its console log.
    pub async fn upload_result_attachments(
        &self,
        run_id: RunId,
        result_id: ResultId,
        result: &ResultData,
    ) -> PublishResult<usize> {
        let target = Target::Result(result_id);
        let mut uploaded = 0;

        for path in &result.attachments {
            if self.upload_file(run_id, target, path).await? {
                uploaded += 1;
            }
        }

        if let Some(request) = result.console_log().and_then(AttachmentRequest::console_log) {
            self.send(run_id, target, &request).await?;
            uploaded += 1;
        }

        Ok(uploaded)
    }

    /// Upload attachments for a batch of `(result, id)` pairs.
    ///
    /// Different results may upload concurrently; each result's own uploads
    /// stay in order.
    pub async fn upload_batch_attachments(
        &self,
        run_id: RunId,
        pairs: &[(&ResultData, ResultId)],
    ) -> PublishResult<usize> {
        let uploads: Vec<_> = pairs
            .iter()
            .copied()
            .filter(|(result, _)| !result.attachments.is_empty() || result.console_log().is_some())
            .map(|(result, result_id)| self.upload_result_attachments(run_id, result_id, result))
            .collect();

        let counts: Vec<usize> = stream::iter(uploads)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        Ok(counts.into_iter().sum())
    }

    async fn upload_file(&self, run_id: RunId, target: Target, path: &Path) -> PublishResult<bool> {
        let request = self
            .request_for_file(path)
            .await
            .map_err(|source| upload_failed(run_id, display_name(path), source))?;

        match request {
            Some(request) => {
                self.send(run_id, target, &request).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn send(&self, run_id: RunId, target: Target, request: &AttachmentRequest) -> PublishResult<()> {
        debug!(
            run_id,
            target = ?target,
            file = %request.file_name,
            kind = %request.kind,
            "uploading attachment"
        );

        let call = async {
            match target {
                Target::Run => {
                    self.service
                        .create_run_attachment(request, &self.project, run_id)
                        .await
                }
                Target::Result(result_id) => {
                    self.service
                        .create_result_attachment(request, &self.project, run_id, result_id)
                        .await
                }
            }
        };

        self.cancel
            .run(call)
            .await
            .map_err(|_| PublishError::Canceled)?
            .map_err(|source| upload_failed(run_id, request.file_name.clone(), source.into()))
    }

    async fn is_uploadable(&self, path: &Path) -> Result<bool, AttachmentError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "attachment not found, skipping");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if !meta.is_file() {
            warn!(path = %path.display(), "attachment is not a file, skipping");
            return Ok(false);
        }

        let len = usize::try_from(meta.len()).unwrap_or(usize::MAX);
        if exceeds(len, self.max_content_len) {
            warn!(
                path = %path.display(),
                bytes = meta.len(),
                limit = self.max_content_len,
                "attachment exceeds maximum attachment size, skipping"
            );
            return Ok(false);
        }

        Ok(true)
    }
}

/// Whether `raw_len` bytes would exceed `limit` once base64 encoded.
fn exceeds(raw_len: usize, limit: usize) -> bool {
    base64::encoded_len(raw_len, true).map_or(true, |encoded| encoded > limit)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn upload_failed(run_id: RunId, file_name: String, source: AttachmentError) -> PublishError {
    PublishError::AttachmentUploadFailed {
        run_id,
        file_name,
        source,
    }
}
