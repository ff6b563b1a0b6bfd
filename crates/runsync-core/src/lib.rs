//! Publishing of parsed test runs to a test-management service.
//!
//! This crate owns the publishing pipeline of a CI agent:
//!
//! - Run lifecycle: create, submit results, complete
//! - Order-preserving batched result submission (1000 results per call)
//! - Attachment classification and upload, per run and per result
//! - Console-log attachments synthesized from captured output
//! - Optional archive mode bundling run attachments into one zip
//!
//! Transport is abstracted behind [`RunsService`]; parsing of results files is
//! abstracted behind [`ResultReader`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use runsync_core::{
//!     JsonResultReader, PublisherConfig, RunAttachmentMode, RunContext, RunsService,
//!     TestRunPublisher,
//! };
//!
//! # async fn example(service: Arc<dyn RunsService>) -> anyhow::Result<()> {
//! let publisher = TestRunPublisher::new(
//!     service,
//!     Arc::new(JsonResultReader),
//!     PublisherConfig::new("Project1"),
//! );
//!
//! let mut context = RunContext::new("owner", "x64", "Release", 42, "", "", "");
//! let run = publisher.read_results_from_file(&mut context, "results.json", Some("nightly"))?;
//!
//! let handle = publisher.start(&run).await?;
//! publisher.add_results(&handle, &run.results).await?;
//! publisher.end(&run, &handle, RunAttachmentMode::Individual).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod attachment;
pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod model;
pub mod publisher;
pub mod service;

pub use archive::{archive_file_name, archive_files};
pub use attachment::{
    classify, AttachmentKind, AttachmentRequest, AttachmentUploader, CONSOLE_LOG_FILE_NAME,
};
pub use batch::{Batch, Batcher, RESULTS_BATCH_SIZE};
pub use cancel::{CancelSource, CancelToken, Canceled};
pub use config::{PublisherConfig, MAX_ATTACHMENT_CONTENT_LEN};
pub use error::{
    AttachmentError, PublishError, PublishResult, ServiceError, ServiceResult,
};
pub use ingest::{JsonResultReader, ResultReader};
pub use lifecycle::{PublishSession, RunLifecycle};
pub use model::{
    RemoteRunHandle, ResultData, ResultId, RunContext, RunData, RunId, RunState,
    RunUpdateModel, TestOutcome,
};
pub use publisher::{RunAttachmentMode, TestRunPublisher};
pub use service::RunsService;
