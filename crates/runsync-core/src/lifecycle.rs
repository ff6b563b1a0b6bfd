//! Run lifecycle state machine.
//!
//! ```text
//! Created ──start──▶ Started ──end──▶ Completed
//!                     │  ▲
//!                     └──┘ add_results
//! ```
//!
//! There is no transition out of `Completed`.

use tracing::debug;

use crate::error::{PublishError, PublishResult};
use crate::model::{RemoteRunHandle, ResultData, ResultId, RunData};
use crate::publisher::{RunAttachmentMode, TestRunPublisher};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunLifecycle {
    /// Local data only.
    #[default]
    Created,
    /// Remote run exists.
    Started(RemoteRunHandle),
    /// Remote run marked completed.
    Completed(RemoteRunHandle),
}

impl RunLifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started(_) => "started",
            Self::Completed(_) => "completed",
        }
    }

    /// Handle of the remote run, once bound.
    pub fn handle(&self) -> Option<&RemoteRunHandle> {
        match self {
            Self::Created => None,
            Self::Started(handle) | Self::Completed(handle) => Some(handle),
        }
    }

    /// `Created -> Started`.
    pub fn bind(&mut self, handle: RemoteRunHandle) -> PublishResult<()> {
        match self {
            Self::Created => {
                *self = Self::Started(handle);
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// `Started -> Completed`.
    pub fn complete(&mut self) -> PublishResult<()> {
        match self {
            Self::Started(handle) => {
                *self = Self::Completed(handle.clone());
                Ok(())
            }
            _ => Err(self.invalid("complete")),
        }
    }

    fn started_handle(&self, operation: &'static str) -> PublishResult<&RemoteRunHandle> {
        match self {
            Self::Started(handle) => Ok(handle),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> PublishError {
        PublishError::InvalidState {
            operation,
            state: self.name(),
        }
    }
}

/// A run being published, with its lifecycle checked on every call.
pub struct PublishSession<'a> {
    publisher: &'a TestRunPublisher,
    run: RunData,
    lifecycle: RunLifecycle,
}

impl<'a> PublishSession<'a> {
    pub fn new(publisher: &'a TestRunPublisher, run: RunData) -> Self {
        Self {
            publisher,
            run,
            lifecycle: RunLifecycle::Created,
        }
    }

    pub fn run(&self) -> &RunData {
        &self.run
    }

    pub fn lifecycle(&self) -> &RunLifecycle {
        &self.lifecycle
    }

    /// Create the remote run. Only valid once.
    pub async fn start(&mut self) -> PublishResult<RemoteRunHandle> {
        if self.lifecycle != RunLifecycle::Created {
            return Err(self.lifecycle.invalid("start"));
        }
        let handle = self.publisher.start(&self.run).await?;
        self.lifecycle.bind(handle.clone())?;
        debug!(run_id = handle.id, "session started");
        Ok(handle)
    }

    /// Submit results to the started run. May be called any number of times.
    pub async fn add_results(&mut self, results: &[ResultData]) -> PublishResult<Vec<ResultId>> {
        let handle = self.lifecycle.started_handle("add results to")?;
        self.publisher.add_results(handle, results).await
    }

    /// Submit the results carried by the run itself.
    pub async fn add_run_results(&mut self) -> PublishResult<Vec<ResultId>> {
        let handle = self.lifecycle.started_handle("add results to")?;
        self.publisher.add_results(handle, &self.run.results).await
    }

    /// Complete the run and publish run-level attachments.
    ///
    /// The session moves to `Completed` as soon as the state update succeeds,
    /// even if an attachment upload fails afterwards.
    pub async fn end(&mut self, mode: RunAttachmentMode) -> PublishResult<()> {
        let handle = self.lifecycle.started_handle("end")?.clone();
        self.publisher.complete_run(&self.run, &handle).await?;
        self.lifecycle.complete()?;
        self.publisher
            .publish_run_attachments(&self.run, &handle, mode)
            .await?;
        Ok(())
    }
}
