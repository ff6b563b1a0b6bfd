//! Request and response bodies of the runs API.
//!
//! Local-only data (attachment paths, console logs, nested results) never
//! appears in a request body; it travels through the attachment endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use runsync_core::{ResultData, ResultId, RunData, RunState, TestOutcome};

/// Body of `POST /runs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCreateModel<'a> {
    pub name: &'a str,

    #[serde(rename = "automated")]
    pub is_automated: bool,

    pub state: RunState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(rename = "type", skip_serializing_if = "str::is_empty")]
    pub run_type: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub build_flavor: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub build_platform: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub release_uri: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub release_environment_uri: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<IdentityReference<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildReference {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityReference<'a> {
    pub display_name: &'a str,
}

fn identity(name: &str) -> Option<IdentityReference<'_>> {
    (!name.is_empty()).then_some(IdentityReference { display_name: name })
}

impl<'a> From<&'a RunData> for RunCreateModel<'a> {
    fn from(run: &'a RunData) -> Self {
        Self {
            name: &run.name,
            is_automated: run.is_automated,
            state: run.state,
            build: (run.build_id != 0).then_some(BuildReference { id: run.build_id }),
            complete_date: run.completed_date,
            due_date: run.due_date,
            run_type: &run.run_type,
            build_flavor: &run.build_flavor,
            build_platform: &run.build_platform,
            release_uri: &run.release_uri,
            release_environment_uri: &run.release_environment_uri,
            owner: identity(&run.owner),
        }
    }
}

/// One element of the `POST /runs/{id}/results` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCreateModel<'a> {
    pub test_case_title: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub automated_test_name: &'a str,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub automated_test_storage: &'a str,

    pub outcome: TestOutcome,

    pub state: &'static str,

    pub duration_in_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<IdentityReference<'a>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,

    pub priority: i32,
}

impl<'a> From<&'a ResultData> for ResultCreateModel<'a> {
    fn from(result: &'a ResultData) -> Self {
        Self {
            test_case_title: &result.test_case_title,
            automated_test_name: &result.automated_test_name,
            automated_test_storage: &result.automated_test_storage,
            outcome: result.outcome,
            state: "Completed",
            duration_in_ms: result.duration_in_ms,
            error_message: result.error_message.as_deref(),
            stack_trace: result.stack_trace.as_deref(),
            computer_name: result.computer_name.as_deref(),
            owner: result.owner.as_deref().and_then(identity),
            started_date: result.started_date,
            completed_date: result.completed_date,
            priority: result.priority,
        }
    }
}

/// Response of `POST /runs/{id}/results`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultList {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<ResultReference>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResultReference {
    pub id: ResultId,
}

impl ResultList {
    pub fn ids(&self) -> Vec<ResultId> {
        self.value.iter().map(|r| r.id).collect()
    }
}
