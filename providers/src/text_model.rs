//! Anthropic Messages API client used by the text-model strategy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use vantage_types::ApiKey;
use vantage_types::text::truncate_chars;

use crate::{BackendError, CLAUDE_MESSAGES_API_URL, DEFAULT_TIMEOUT_SECS, ensure_success};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const NO_API_KEY_ANSWER: &str = "[No API key]";
const ERROR_REASON_MAX_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct TextModelOptions {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout: Duration,
}

impl TextModelOptions {
    #[must_use]
    pub fn new(api_key: Option<ApiKey>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            max_tokens: 500,
            endpoint: CLAUDE_MESSAGES_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Outcome of one completion. Failures are carried in-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub answer: String,
    pub success: bool,
}

impl Completion {
    fn failed(answer: String) -> Self {
        Self {
            answer,
            success: false,
        }
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TextModelClient {
    http: reqwest::Client,
    options: TextModelOptions,
}

impl TextModelClient {
    pub fn new(options: TextModelOptions) -> Result<Self, BackendError> {
        let http = crate::http_client_with_timeout(options.timeout)?;
        Ok(Self { http, options })
    }

    /// Send `prompt` as a single user message and return the first text block.
    pub async fn complete(&self, prompt: &str) -> Completion {
        let Some(api_key) = self.options.api_key.as_ref() else {
            tracing::warn!("Text-model completion requested without an API key");
            return Completion::failed(NO_API_KEY_ANSWER.to_string());
        };

        tracing::debug!(
            model = %self.options.model,
            prompt_chars = prompt.chars().count(),
            "Sending text-model completion"
        );

        match self.request(api_key, prompt).await {
            Ok(answer) => Completion {
                answer,
                success: true,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Text-model completion failed");
                let reason = truncate_chars(&err.to_string(), ERROR_REASON_MAX_CHARS);
                Completion::failed(format!("[LLM error: {reason}]"))
            }
        }
    }

    async fn request(&self, api_key: &ApiKey, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.options.model,
            "max_tokens": self.options.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .http
            .post(&self.options.endpoint)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let response = ensure_success(response).await?;
        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| BackendError::Decode("response has no text content".to_string()))
    }
}
