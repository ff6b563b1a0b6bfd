//! In-memory model of a test run as handed to the publisher.
//!
//! These types are produced by a [`ResultReader`](crate::ingest::ResultReader)
//! and consumed by [`TestRunPublisher`](crate::publisher::TestRunPublisher).
//! Serialized form (camelCase) doubles as the native results document read by
//! [`JsonResultReader`](crate::ingest::JsonResultReader).

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the remote service assigns to a run.
pub type RunId = i64;

/// Identifier the remote service assigns to a submitted test-case result.
pub type ResultId = i64;

/// Correlation data for a run, supplied by the CI host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub owner: String,
    pub platform: String,
    pub configuration: String,
    pub build_id: i64,
    pub build_uri: String,
    pub release_uri: String,
    pub release_environment_uri: String,

    /// Display name requested for the run. Stamped by
    /// [`read_results_from_file`](crate::publisher::TestRunPublisher::read_results_from_file)
    /// when the caller passes one.
    #[serde(default)]
    pub run_name: Option<String>,
}

impl RunContext {
    pub fn new(
        owner: impl Into<String>,
        platform: impl Into<String>,
        configuration: impl Into<String>,
        build_id: i64,
        build_uri: impl Into<String>,
        release_uri: impl Into<String>,
        release_environment_uri: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            platform: platform.into(),
            configuration: configuration.into(),
            build_id,
            build_uri: build_uri.into(),
            release_uri: release_uri.into(),
            release_environment_uri: release_environment_uri.into(),
            run_name: None,
        }
    }
}

/// Remote lifecycle state of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    NotStarted,
    #[default]
    InProgress,
    Waiting,
    Completed,
    Aborted,
    NeedsInvestigation,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Waiting => "Waiting",
            Self::Completed => "Completed",
            Self::Aborted => "Aborted",
            Self::NeedsInvestigation => "NeedsInvestigation",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level payload produced by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    /// Run display name. Must be non-empty before the run is started.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub build_id: i64,

    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub state: RunState,

    #[serde(default)]
    pub is_automated: bool,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, rename = "type")]
    pub run_type: String,

    #[serde(default)]
    pub build_flavor: String,

    #[serde(default)]
    pub build_platform: String,

    #[serde(default)]
    pub release_uri: String,

    #[serde(default)]
    pub release_environment_uri: String,

    #[serde(default)]
    pub owner: String,

    /// Run-level attachment files, uploaded when the run is ended.
    #[serde(default)]
    pub attachments: Vec<PathBuf>,

    /// Parsed test-case results, submitted separately through `add_results`.
    #[serde(default)]
    pub results: Vec<ResultData>,
}

impl RunData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_automated: true,
            ..Default::default()
        }
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = PathBuf>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    pub fn with_results(mut self, results: Vec<ResultData>) -> Self {
        self.results = results;
        self
    }
}

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOutcome {
    #[default]
    None,
    Passed,
    Failed,
    Inconclusive,
    Timeout,
    Aborted,
    Blocked,
    NotExecuted,
    Warning,
    Error,
    NotApplicable,
    Paused,
    InProgress,
    NotImpacted,
}

/// One test case's outcome plus its evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    #[serde(default)]
    pub test_case_title: String,

    #[serde(default)]
    pub automated_test_name: String,

    #[serde(default)]
    pub automated_test_storage: String,

    #[serde(default)]
    pub outcome: TestOutcome,

    #[serde(default)]
    pub duration_in_ms: f64,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub stack_trace: Option<String>,

    #[serde(default)]
    pub computer_name: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub started_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority: i32,

    /// Files uploaded as result-level attachments, in order.
    #[serde(default)]
    pub attachments: Vec<PathBuf>,

    /// Captured standard output. `None` or empty means no console log.
    #[serde(default)]
    pub console_log: Option<String>,
}

impl ResultData {
    pub fn new(test_case_title: impl Into<String>, outcome: TestOutcome) -> Self {
        let title = test_case_title.into();
        Self {
            automated_test_name: title.clone(),
            test_case_title: title,
            outcome,
            ..Default::default()
        }
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = PathBuf>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    pub fn with_console_log(mut self, log: impl Into<String>) -> Self {
        self.console_log = Some(log.into());
        self
    }

    /// Console log text, if there is any to publish.
    pub fn console_log(&self) -> Option<&str> {
        self.console_log.as_deref().filter(|log| !log.is_empty())
    }
}

/// Handle returned by the service when a run is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRunHandle {
    pub id: RunId,
    #[serde(default)]
    pub name: String,
}

impl RemoteRunHandle {
    pub fn new(id: RunId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Fields updated on the remote run when it is ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunUpdateModel {
    pub state: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

impl RunUpdateModel {
    pub fn completed(completed_date: Option<DateTime<Utc>>) -> Self {
        Self {
            state: RunState::Completed,
            completed_date,
        }
    }
}
