//! Mode-specific analysis behavior.

use vantage_config::Settings;
use vantage_providers::{
    BackendError, DoorwayClient, DoorwayOptions, DoorwayResponse, TextModelClient,
    TextModelOptions,
};
use vantage_types::{Mode, VantageError};

/// The analysis backend a session talks to, fixed when the session starts.
///
/// - `Standalone` hands prompts back to the user and never mutates on its own.
/// - `TextModel` asks a text-completion model and degrades in-band on failure.
/// - `Geometric` asks Doorway and propagates its failures.
#[derive(Debug, Clone)]
pub enum AnalysisStrategy {
    Standalone,
    TextModel(TextModelClient),
    Geometric(DoorwayClient),
}

impl AnalysisStrategy {
    /// Build the strategy for `mode` from resolved settings.
    ///
    /// Geometric mode without a Doorway address is an `ExternalService` error.
    pub fn for_mode(mode: Mode, settings: &Settings) -> Result<Self, VantageError> {
        match mode {
            Mode::Standalone => Ok(Self::Standalone),
            Mode::TextModel => {
                let text = &settings.text_model;
                let options = TextModelOptions {
                    api_key: text.api_key.clone(),
                    model: text.model.clone(),
                    max_tokens: text.max_tokens,
                    endpoint: text.endpoint.clone(),
                    timeout: text.timeout,
                };
                TextModelClient::new(options)
                    .map(Self::TextModel)
                    .map_err(backend_failure)
            }
            Mode::GeometricModel => {
                let Some(doorway) = settings.doorway.as_ref() else {
                    return Err(VantageError::external(
                        "geometric mode requires a Doorway URL (DOORWAY_API_URL)",
                    ));
                };
                let options = DoorwayOptions {
                    url: doorway.url.clone(),
                    session_name: doorway.session_name.clone(),
                    timeout: doorway.timeout,
                };
                DoorwayClient::new(options)
                    .map(Self::Geometric)
                    .map_err(backend_failure)
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Standalone => Mode::Standalone,
            Self::TextModel(_) => Mode::TextModel,
            Self::Geometric(_) => Mode::GeometricModel,
        }
    }
}

pub(crate) fn backend_failure(err: BackendError) -> VantageError {
    VantageError::external(err.to_string())
}

/// One Doorway round trip, with failures mapped into the session error taxonomy.
pub(crate) async fn run_doorway(
    client: &DoorwayClient,
    prompt: &str,
) -> Result<(DoorwayResponse, serde_json::Value), VantageError> {
    client.run(prompt).await.map_err(|err| {
        tracing::warn!(error = %err, "Doorway call failed");
        backend_failure(err)
    })
}
