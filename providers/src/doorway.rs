//! Doorway geometric-reasoning client.
//!
//! Doorway answers a free-text input with a verdict (`status`), a structural
//! fit (`structure`), the answer itself (`content`) and optionally the
//! assumptions it had to bridge (`bridge`) or a detected conflict
//! (`conflict`). Every field is optional on the wire; the accessors on
//! [`DoorwayResponse`] apply the documented defaults.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use vantage_types::GeometricStatus;

use crate::{BackendError, DEFAULT_TIMEOUT_SECS, ensure_success};

/// Gap score assumed when the response carries none. Yields significance `0`.
pub const DEFAULT_GAP_SCORE: f64 = 1.0;
pub const DEFAULT_SHAPE: &str = "unknown";
pub const DEFAULT_CONFLICT_MESSAGE: &str = "Conflict detected";

#[derive(Debug, Clone)]
pub struct DoorwayOptions {
    /// Base URL; `/run` is appended.
    pub url: String,
    pub session_name: String,
    pub timeout: Duration,
}

impl DoorwayOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            session_name: "vantagepoint".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Structure {
    pub closest_shape: Option<String>,
    pub gap_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Content {
    pub answer: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bridge {
    #[serde(default)]
    pub assumptions: Vec<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Conflict {
    #[serde(default)]
    pub conflict: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DoorwayResponse {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: GeometricStatus,
    pub structure: Option<Structure>,
    pub content: Option<Content>,
    pub bridge: Option<Bridge>,
    pub conflict: Option<Conflict>,
}

/// Unrecognised or null statuses read as `Provisional`.
fn lenient_status<'de, D>(deserializer: D) -> Result<GeometricStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("GROUND") => GeometricStatus::Ground,
        Some("BRIDGE") => GeometricStatus::Bridge,
        Some("CONFLICT") => GeometricStatus::Conflict,
        _ => GeometricStatus::Provisional,
    })
}

impl DoorwayResponse {
    #[must_use]
    pub fn answer(&self) -> &str {
        self.content
            .as_ref()
            .and_then(|c| c.answer.as_deref())
            .unwrap_or("")
    }

    #[must_use]
    pub fn content_confidence(&self) -> Option<f64> {
        self.content.as_ref().and_then(|c| c.confidence)
    }

    #[must_use]
    pub fn shape(&self) -> &str {
        self.structure
            .as_ref()
            .and_then(|s| s.closest_shape.as_deref())
            .unwrap_or(DEFAULT_SHAPE)
    }

    /// Raw gap score, if the backend reported one.
    #[must_use]
    pub fn gap_score(&self) -> Option<f64> {
        self.structure.as_ref().and_then(|s| s.gap_score)
    }

    /// `1 - gap_score`, with a missing gap score treated as [`DEFAULT_GAP_SCORE`].
    #[must_use]
    pub fn significance(&self) -> f64 {
        1.0 - self.gap_score().unwrap_or(DEFAULT_GAP_SCORE)
    }

    /// Bridged assumptions; empty when there is no bridge.
    #[must_use]
    pub fn bridge_assumptions(&self) -> &[String] {
        self.bridge
            .as_ref()
            .map_or(&[][..], |b| b.assumptions.as_slice())
    }

    /// The conflict message when a conflict was flagged.
    #[must_use]
    pub fn conflict_message(&self) -> Option<&str> {
        self.conflict
            .as_ref()
            .filter(|c| c.conflict)
            .map(|c| c.message.as_deref().unwrap_or(DEFAULT_CONFLICT_MESSAGE))
    }
}

#[derive(Debug, Clone)]
pub struct DoorwayClient {
    http: reqwest::Client,
    options: DoorwayOptions,
}

impl DoorwayClient {
    pub fn new(options: DoorwayOptions) -> Result<Self, BackendError> {
        let http = crate::http_client_with_timeout(options.timeout)?;
        Ok(Self { http, options })
    }

    /// Submit `input` and return both the typed response and the raw JSON.
    pub async fn run(&self, input: &str) -> Result<(DoorwayResponse, Value), BackendError> {
        let url = format!("{}/run", self.options.url.trim_end_matches('/'));
        tracing::debug!(
            url = %url,
            input_chars = input.chars().count(),
            "Calling Doorway"
        );

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "input": input,
                "session_name": self.options.session_name,
            }))
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let response = ensure_success(response).await?;
        let raw: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let parsed = DoorwayResponse::deserialize(&raw)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok((parsed, raw))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use vantage_types::GeometricStatus;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{DoorwayClient, DoorwayOptions, DoorwayResponse};
    use crate::BackendError;

    fn client_for(server: &MockServer) -> DoorwayClient {
        let mut options = DoorwayOptions::new(server.uri());
        options.timeout = Duration::from_secs(5);
        DoorwayClient::new(options).unwrap()
    }

    #[test]
    fn empty_response_uses_defaults() {
        let parsed: DoorwayResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parsed.status, GeometricStatus::Provisional);
        assert_eq!(parsed.answer(), "");
        assert_eq!(parsed.shape(), "unknown");
        assert!(parsed.significance().abs() < f64::EPSILON);
        assert!(parsed.bridge_assumptions().is_empty());
        assert!(parsed.conflict_message().is_none());
    }

    #[test]
    fn unknown_status_reads_as_provisional() {
        let parsed: DoorwayResponse =
            serde_json::from_value(json!({ "status": "SIDEWAYS" })).unwrap();
        assert_eq!(parsed.status, GeometricStatus::Provisional);
    }

    #[test]
    fn conflict_without_message_uses_default() {
        let parsed: DoorwayResponse =
            serde_json::from_value(json!({ "conflict": { "conflict": true } })).unwrap();
        assert_eq!(parsed.conflict_message(), Some("Conflict detected"));

        let quiet: DoorwayResponse =
            serde_json::from_value(json!({ "conflict": { "conflict": false, "message": "x" } }))
                .unwrap();
        assert!(quiet.conflict_message().is_none());
    }

    #[tokio::test]
    async fn run_posts_input_and_session_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/run"))
            .and(body_json(json!({
                "input": "Problem space: x",
                "session_name": "vantagepoint",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "BRIDGE",
                "structure": { "closest_shape": "funnel", "gap_score": 0.25 },
                "content": { "answer": "Staging gate is habit", "confidence": 0.8 },
                "bridge": { "assumptions": ["reviews need two approvers"], "confidence": 0.55 },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (parsed, raw) = client_for(&server).run("Problem space: x").await.unwrap();
        assert_eq!(parsed.status, GeometricStatus::Bridge);
        assert_eq!(parsed.shape(), "funnel");
        assert!((parsed.significance() - 0.75).abs() < 1e-9);
        assert_eq!(parsed.bridge_assumptions(), ["reviews need two approvers"]);
        assert_eq!(raw["content"]["answer"], "Staging gate is habit");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/run"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).run("input").await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let mut options = DoorwayOptions::new("http://127.0.0.1:9");
        options.timeout = Duration::from_secs(2);
        let client = DoorwayClient::new(options).unwrap();
        let err = client.run("input").await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
