//! Clients for the two analysis backends.
//!
//! - [`text_model`] - Anthropic Messages API, one prompt in, one answer out
//! - [`doorway`] - Doorway geometric-reasoning service (`POST {url}/run`)
//!
//! # Error Handling
//!
//! The text-model client never fails: transport and API errors come back
//! in-band as a [`text_model::Completion`] with `success == false`, so a
//! non-critical analysis step can keep moving. The Doorway client returns
//! [`BackendError`] and leaves the policy to the caller.

pub mod doorway;
pub mod text_model;

use std::time::Duration;

use thiserror::Error;

pub use doorway::{DoorwayClient, DoorwayOptions, DoorwayResponse};
pub use text_model::{Completion, TextModelClient, TextModelOptions};

/// Canonical Anthropic Messages API endpoint.
pub const CLAUDE_MESSAGES_API_URL: &str = "https://api.anthropic.com/v1/messages";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_ERROR_BODY_CHARS: usize = 2048;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
}

/// Build a client whose requests give up after `timeout`.
pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    base_client_builder()
        .timeout(timeout)
        .build()
        .map_err(BackendError::Client)
}

/// Turn a non-2xx response into [`BackendError::Status`], keeping a bounded
/// slice of the body for diagnostics.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body: vantage_types::text::truncate_to_fit(&body, MAX_ERROR_BODY_CHARS, "...(truncated)"),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{BackendError, http_client_with_timeout};

    #[test]
    fn client_builds_with_timeout() {
        assert!(http_client_with_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn status_error_display_includes_code() {
        let err = BackendError::Status {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: down");
    }
}
