//! Shared fixtures: an in-memory RunsService that records every call.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use runsync_core::{
    AttachmentRequest, PublisherConfig, RemoteRunHandle, ResultData, ResultId, ResultReader,
    RunContext, RunData, RunId, RunUpdateModel, RunsService, ServiceError, ServiceResult,
    TestRunPublisher,
};

pub const PROJECT: &str = "Project1";

#[derive(Debug, Default)]
pub struct Recorded {
    pub created: Vec<(String, RunData)>,
    pub updates: Vec<(String, RunId, RunUpdateModel)>,
    pub batches: Vec<Vec<String>>,
    pub run_attachments: Vec<(String, RunId, AttachmentRequest)>,
    pub result_attachments: BTreeMap<ResultId, Vec<AttachmentRequest>>,
}

impl Recorded {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Vec::len).collect()
    }
}

/// Records calls; assigns result ids 1, 2, 3, ... across the whole run.
#[derive(Default)]
pub struct RecordingService {
    pub calls: Mutex<Recorded>,
    next_result_id: AtomicI64,
    fail_batch: Option<usize>,
    drop_last_id: bool,
    fail_update: bool,
    fail_attachments: bool,
    batch_delay: Option<Duration>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`-th add_results call fails with a server error.
    pub fn failing_batch(mut self, index: usize) -> Self {
        self.fail_batch = Some(index);
        self
    }

    /// add_results returns one id too few.
    pub fn dropping_last_id(mut self) -> Self {
        self.drop_last_id = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn failing_attachments(mut self) -> Self {
        self.fail_attachments = true;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.calls.lock().unwrap()
    }
}

fn server_error() -> ServiceError {
    ServiceError::Server {
        status: 500,
        message: "boom".to_string(),
    }
}

#[async_trait]
impl RunsService for RecordingService {
    async fn create_run(&self, project: &str, run: &RunData) -> ServiceResult<RemoteRunHandle> {
        self.recorded()
            .created
            .push((project.to_string(), run.clone()));
        Ok(RemoteRunHandle::new(1, "TestRun"))
    }

    async fn update_run(
        &self,
        project: &str,
        run_id: RunId,
        update: &RunUpdateModel,
    ) -> ServiceResult<()> {
        if self.fail_update {
            return Err(server_error());
        }
        self.recorded()
            .updates
            .push((project.to_string(), run_id, update.clone()));
        Ok(())
    }

    async fn add_results(
        &self,
        results: &[ResultData],
        _project: &str,
        _run_id: RunId,
    ) -> ServiceResult<Vec<ResultId>> {
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }

        let index = {
            let mut calls = self.recorded();
            calls
                .batches
                .push(results.iter().map(|r| r.test_case_title.clone()).collect());
            calls.batches.len() - 1
        };
        if self.fail_batch == Some(index) {
            return Err(server_error());
        }

        let mut ids: Vec<ResultId> = results
            .iter()
            .map(|_| self.next_result_id.fetch_add(1, Ordering::SeqCst) + 1)
            .collect();
        if self.drop_last_id {
            ids.pop();
        }
        Ok(ids)
    }

    async fn create_run_attachment(
        &self,
        attachment: &AttachmentRequest,
        project: &str,
        run_id: RunId,
    ) -> ServiceResult<()> {
        if self.fail_attachments {
            return Err(server_error());
        }
        self.recorded()
            .run_attachments
            .push((project.to_string(), run_id, attachment.clone()));
        Ok(())
    }

    async fn create_result_attachment(
        &self,
        attachment: &AttachmentRequest,
        _project: &str,
        _run_id: RunId,
        result_id: ResultId,
    ) -> ServiceResult<()> {
        if self.fail_attachments {
            return Err(server_error());
        }
        self.recorded()
            .result_attachments
            .entry(result_id)
            .or_default()
            .push(attachment.clone());
        Ok(())
    }
}

/// Reader that remembers what it was asked to read and returns a fixed run.
#[derive(Default)]
pub struct StubReader {
    pub seen: Mutex<Option<(RunContext, PathBuf)>>,
    pub run_attachments: Vec<PathBuf>,
}

impl StubReader {
    pub fn with_run_attachments(attachments: Vec<PathBuf>) -> Self {
        Self {
            seen: Mutex::new(None),
            run_attachments: attachments,
        }
    }

    pub fn seen(&self) -> Option<(RunContext, PathBuf)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ResultReader for StubReader {
    fn read_results(&self, context: &RunContext, path: &Path) -> anyhow::Result<RunData> {
        *self.seen.lock().unwrap() = Some((context.clone(), path.to_path_buf()));
        let mut run = RunData::new("xyz").with_attachments(self.run_attachments.clone());
        run.build_id = context.build_id;
        run.build_flavor = context.configuration.clone();
        run.build_platform = context.platform.clone();
        run.release_uri = context.release_uri.clone();
        run.release_environment_uri = context.release_environment_uri.clone();
        Ok(run)
    }
}

pub fn run_context() -> RunContext {
    RunContext::new(
        "owner",
        "platform",
        "config",
        1,
        "builduri",
        "releaseuri",
        "releaseenvuri",
    )
}

pub fn publisher(service: &Arc<RecordingService>, reader: &Arc<StubReader>) -> TestRunPublisher {
    TestRunPublisher::new(
        Arc::clone(service) as Arc<dyn RunsService>,
        Arc::clone(reader) as Arc<dyn ResultReader>,
        PublisherConfig::new(PROJECT),
    )
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
