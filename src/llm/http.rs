//! HTTP plumbing shared by the hosted LLM clients.
//!
//! Every provider gets the same treatment: a client with a request timeout,
//! bounded retries with exponential backoff on rate limits, server errors,
//! timeouts and refused connections, and error bodies reduced to one line.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{MendError, Result};

/// Maximum number of attempts per completion.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Longest a completion can take when every attempt runs into the request
/// timeout: all attempts plus the backoff sleeps between them.
pub fn completion_budget(request_timeout_secs: u64) -> Duration {
    let requests = Duration::from_secs(request_timeout_secs) * MAX_RETRY_ATTEMPTS;
    let backoff = (1..MAX_RETRY_ATTEMPTS)
        .map(|n| Duration::from_millis(RETRY_BASE_DELAY_MS << (n - 1)))
        .sum::<Duration>();
    requests + backoff
}

/// Builds an HTTP client whose requests time out after `timeout_secs`.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MendError::llm(format!("Failed to create HTTP client: {e}")))
}

/// A failed exchange and whether sending it again may help.
#[derive(Debug)]
pub(crate) struct Rejection {
    pub error: MendError,
    pub retryable: bool,
}

/// Identifies the provider in error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Provider {
    /// Human-readable name, e.g. "OpenAI".
    pub name: &'static str,
    /// Variable holding the API key, if the provider needs one.
    pub key_var: Option<&'static str>,
    /// Hint shown when the endpoint cannot be reached.
    pub connect_hint: &'static str,
}

impl Provider {
    /// Classifies an error raised before a response arrived.
    pub fn transport_error(&self, e: &reqwest::Error) -> Rejection {
        if e.is_timeout() {
            Rejection {
                error: MendError::llm(format!("Request to {} timed out. Try again.", self.name)),
                retryable: true,
            }
        } else if e.is_connect() {
            Rejection {
                error: MendError::llm(format!(
                    "Failed to connect to {}. {}",
                    self.name, self.connect_hint
                )),
                retryable: true,
            }
        } else {
            Rejection {
                error: MendError::llm(format!("Request to {} failed: {e}", self.name)),
                retryable: false,
            }
        }
    }

    /// Classifies a non-success HTTP status.
    pub fn status_error(&self, status: StatusCode, body: &str) -> Rejection {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let hint = match self.key_var {
                Some(var) => format!("Check your {var}."),
                None => "Check the endpoint credentials.".to_string(),
            };
            return Rejection {
                error: MendError::llm(format!("Authentication with {} failed. {hint}", self.name)),
                retryable: false,
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Rejection {
                error: MendError::llm(format!(
                    "Rate limited by {}. Please wait and try again.",
                    self.name
                )),
                retryable: true,
            };
        }

        let message = match error_detail(body) {
            Some(detail) => format!("{} API error: {detail}", self.name),
            None => format!("{} API error ({status}): {}", self.name, body.trim()),
        };
        Rejection {
            error: MendError::llm(message),
            retryable: status.is_server_error(),
        }
    }
}

/// Sends the request produced by `build`, retrying retryable failures.
///
/// Returns the body of the first successful response.
pub(crate) async fn send_with_retry<F>(provider: Provider, build: F) -> Result<String>
where
    F: Fn() -> RequestBuilder,
{
    let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
    let mut attempt = 1;

    loop {
        debug!(
            "{} request attempt {} of {}",
            provider.name, attempt, MAX_RETRY_ATTEMPTS
        );

        let rejection = match build().send().await {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .map_err(|e| MendError::llm(format!("Failed to read response: {e}")))?;
                if status.is_success() {
                    return Ok(body);
                }
                provider.status_error(status, &body)
            }
            Err(e) => provider.transport_error(&e),
        };

        if !rejection.retryable || attempt >= MAX_RETRY_ATTEMPTS {
            return Err(rejection.error);
        }

        warn!(
            "{} request failed (attempt {}), retrying in {:?}: {}",
            provider.name, attempt, delay, rejection.error
        );
        tokio::time::sleep(delay).await;
        delay *= 2;
        attempt += 1;
    }
}

/// Error bodies come as `{"error": {"message": ..}}` or `{"error": ".."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorMessage },
    Flat { error: String },
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body).ok()? {
        ErrorBody::Nested { error } => Some(error.message),
        ErrorBody::Flat { error } => Some(error),
    }
}
