//! HTTP layer: status mapping and retry.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use tracing::warn;

use crate::auth::TokenProvider;
use crate::error::{ClientError, ClientResult};

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP backend for making requests (holds reqwest client, auth, retry budget).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) token_provider: TokenProvider,
    pub(crate) max_retries: u32,
}

impl HttpBackend {
    /// Send a JSON body, retrying transient failures.
    pub(crate) async fn send_json<B>(&self, method: Method, url: &Url, body: &B) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let mut retries = 0;

        loop {
            match self.send_once(method.clone(), url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff(&e, retries);

                    warn!(
                        error = %e,
                        method = %method,
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis(),
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<B>(&self, method: Method, url: &Url, body: &B) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method, url.clone()).json(body);

        if let Some(token) = self.token_provider.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        check_status(url, response).await
    }
}

async fn check_status(url: &Url, response: Response) -> ClientResult<Response> {
    let status = response.status();

    match status.as_u16() {
        200..=299 => Ok(response),

        401 | 403 => Err(ClientError::Unauthorized {
            message: format!("HTTP {}: invalid or expired token", status.as_u16()),
        }),

        404 => Err(ClientError::NotFound {
            url: url.to_string(),
        }),

        429 => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);

            Err(ClientError::RateLimited { retry_after })
        }

        400..=499 => Err(ClientError::Rejected {
            status: status.as_u16(),
            message: body_text(status, response).await,
        }),

        _ => Err(ClientError::Server {
            status: status.as_u16(),
            message: body_text(status, response).await,
        }),
    }
}

async fn body_text(status: StatusCode, response: Response) -> String {
    match response.text().await {
        Ok(text) if !text.is_empty() => text,
        _ => status.to_string(),
    }
}

/// Delay before retry number `retries` (1-based).
///
/// Rate limits honour `Retry-After` (capped, ±10% jitter); everything else
/// uses full-jitter exponential backoff.
fn backoff(err: &ClientError, retries: u32) -> Duration {
    use rand::Rng;

    match err {
        ClientError::RateLimited {
            retry_after: Some(retry_after),
        } => {
            let base_ms = (*retry_after).min(MAX_BACKOFF).as_millis() as u64;
            let jitter_factor: f64 = rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
            let jittered_ms = ((base_ms as f64) * jitter_factor).round() as u64;
            Duration::from_millis(jittered_ms.max(100))
        }
        _ => {
            let base = Duration::from_secs(1u64 << retries.min(5)).min(MAX_BACKOFF);
            let jittered_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
            Duration::from_millis(jittered_ms.max(10))
        }
    }
}
