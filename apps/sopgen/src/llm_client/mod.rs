//! LLM clients: the only modules that talk to the hosted model APIs.
//!
//! Two services are used:
//! - `gemini`: generative-language API, used for course metadata extraction
//! - `openrouter`: chat-completion API, used for SOP generation
//!
//! Both share the HTTP client construction, retry loop and fence stripping here.
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod openrouter;
pub mod prompts;

/// Failure of a single model call, after retries.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model API still rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("model returned no text")]
    EmptyContent,
}

/// Retry and timeout policy shared by both model clients.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Both APIs wrap errors as `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Sends the request built by `make_request`, retrying transport errors, 429
/// and 5xx responses with exponential backoff. Other non-success statuses fail
/// immediately.
pub(crate) async fn send_with_retry<F>(
    make_request: F,
    policy: RetryPolicy,
) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match make_request().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: max_attempts,
    }))
}

/// Returns the body of a markdown code fence (optionally tagged `json`) if the
/// reply is wrapped in one, otherwise the trimmed reply. A missing closing
/// fence is tolerated.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = after_fence
        .strip_prefix("json")
        .or_else(|| after_fence.strip_prefix("JSON"))
        .unwrap_or(after_fence);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
