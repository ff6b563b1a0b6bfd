//! HTTP transport for the runsync publisher.
//!
//! [`RunsClient`] implements [`runsync_core::RunsService`] over a JSON REST
//! API rooted at `{url}/{project}/_apis/test`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create run | `POST /runs` |
//! | update run | `PATCH /runs/{runId}` |
//! | add results | `POST /runs/{runId}/results` |
//! | run attachment | `POST /runs/{runId}/attachments` |
//! | result attachment | `POST /runs/{runId}/results/{resultId}/attachments` |
//!
//! Transient failures (429, 5xx, network) are retried with jittered
//! exponential backoff; `Retry-After` is honoured up to 30 seconds.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use runsync_client::{ClientConfig, RunsClient};
//! use runsync_core::{JsonResultReader, PublisherConfig, TestRunPublisher};
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = RunsClient::new(
//!     ClientConfig::from_env().with_url("https://tfs.example.com/DefaultCollection"),
//! )?;
//! let publisher = TestRunPublisher::new(
//!     Arc::new(client),
//!     Arc::new(JsonResultReader),
//!     PublisherConfig::new("Project1"),
//! );
//! # let _ = publisher;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `RUNSYNC_URL` | Collection URL (default: `http://localhost:8080`) |
//! | `RUNSYNC_TOKEN` | Bearer token |
//! | `RUNSYNC_TIMEOUT` | Request timeout in seconds (default: 100) |
//! | `RUNSYNC_MAX_RETRIES` | Max retries for transient failures (default: 3) |

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use auth::TokenProvider;
pub use client::{RunsClient, API_VERSION, CLIENT_USER_AGENT};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
