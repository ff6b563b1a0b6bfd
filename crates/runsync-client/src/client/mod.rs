//! Runs API client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use runsync_core::{
    AttachmentRequest, RemoteRunHandle, ResultData, ResultId, RunData, RunId, RunUpdateModel,
    RunsService, ServiceResult,
};

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::wire::{ResultCreateModel, ResultList, RunCreateModel};

mod http;

use http::HttpBackend;

/// Value sent in the `User-Agent` header.
pub const CLIENT_USER_AGENT: &str = concat!("runsync/", env!("CARGO_PKG_VERSION"));

/// `api-version` query parameter sent with every call.
pub const API_VERSION: &str = "5.0";

/// HTTP implementation of [`RunsService`].
#[derive(Debug, Clone)]
pub struct RunsClient {
    http: HttpBackend,
    base_url: Url,
}

impl RunsClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let token_provider = config
            .token
            .as_ref()
            .map(TokenProvider::static_token)
            .unwrap_or_else(TokenProvider::from_env);

        Self::with_token_provider(config, token_provider)
    }

    pub fn with_token_provider(
        config: ClientConfig,
        token_provider: TokenProvider,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(config.url.trim_end_matches('/')).map_err(|e| {
            ClientError::Config {
                message: format!("invalid service url {:?}: {}", config.url, e),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config {
                message: format!("service url {:?} cannot carry a path", config.url),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                token_provider,
                max_retries: config.max_retries,
            },
            base_url,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.token_provider.is_authenticated()
    }

    /// `{base}/{project}/_apis/test/{segments...}?api-version=...`, each segment percent-encoded.
    fn endpoint(&self, project: &str, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ClientError::Config {
                message: format!("service url {} cannot carry a path", self.base_url),
            })?;
            path.pop_if_empty()
                .push(project)
                .extend(["_apis", "test"])
                .extend(segments);
        }
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                message: format!("failed to parse {} response: {}", what, e),
            })
    }
}

#[async_trait]
impl RunsService for RunsClient {
    async fn create_run(&self, project: &str, run: &RunData) -> ServiceResult<RemoteRunHandle> {
        let url = self.endpoint(project, &["runs"])?;
        debug!(url = %url, name = %run.name, "creating test run");

        let response = self
            .http
            .send_json(Method::POST, &url, &RunCreateModel::from(run))
            .await?;
        Ok(Self::parse(response, "create run").await?)
    }

    async fn update_run(
        &self,
        project: &str,
        run_id: RunId,
        update: &RunUpdateModel,
    ) -> ServiceResult<()> {
        let run_id = run_id.to_string();
        let url = self.endpoint(project, &["runs", &run_id])?;
        debug!(url = %url, state = %update.state, "updating test run");

        self.http.send_json(Method::PATCH, &url, update).await?;
        Ok(())
    }

    async fn add_results(
        &self,
        results: &[ResultData],
        project: &str,
        run_id: RunId,
    ) -> ServiceResult<Vec<ResultId>> {
        let run_id = run_id.to_string();
        let url = self.endpoint(project, &["runs", &run_id, "results"])?;
        debug!(url = %url, count = results.len(), "adding test results");

        let body: Vec<ResultCreateModel<'_>> = results.iter().map(ResultCreateModel::from).collect();
        let response = self.http.send_json(Method::POST, &url, &body).await?;
        let list: ResultList = Self::parse(response, "add results").await?;

        if list.count != 0 && list.count != list.value.len() {
            debug!(count = list.count, ids = list.value.len(), "result count disagrees with returned ids");
        }
        Ok(list.ids())
    }

    async fn create_run_attachment(
        &self,
        attachment: &AttachmentRequest,
        project: &str,
        run_id: RunId,
    ) -> ServiceResult<()> {
        let run_id = run_id.to_string();
        let url = self.endpoint(project, &["runs", &run_id, "attachments"])?;
        debug!(url = %url, file = %attachment.file_name, kind = %attachment.kind, "creating run attachment");

        self.http.send_json(Method::POST, &url, attachment).await?;
        Ok(())
    }

    async fn create_result_attachment(
        &self,
        attachment: &AttachmentRequest,
        project: &str,
        run_id: RunId,
        result_id: ResultId,
    ) -> ServiceResult<()> {
        let run_id = run_id.to_string();
        let result_id = result_id.to_string();
        let url = self.endpoint(
            project,
            &["runs", &run_id, "results", &result_id, "attachments"],
        )?;
        debug!(url = %url, file = %attachment.file_name, kind = %attachment.kind, "creating result attachment");

        self.http.send_json(Method::POST, &url, attachment).await?;
        Ok(())
    }
}
