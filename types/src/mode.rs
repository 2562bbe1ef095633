use std::fmt;

use serde::{Deserialize, Serialize};

/// Which analysis strategy powers a session.
///
/// Resolved once when the session is created and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The user drives all analysis; the engine only builds prompts.
    Standalone,
    /// A text-completion model assists territory expansion and path generation.
    TextModel,
    /// The Doorway geometric-reasoning service powers every analysis step.
    GeometricModel,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Standalone => "standalone",
            Mode::TextModel => "text_model",
            Mode::GeometricModel => "geometric_model",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Mode::Standalone => "Standalone: user drives all analysis",
            Mode::TextModel => "Text model: AI-assisted analysis, no geometric layer",
            Mode::GeometricModel => "Doorway: full geometric reasoning at every step",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Mode;

    #[test]
    fn descriptions_name_their_backend() {
        assert!(Mode::Standalone.description().contains("Standalone"));
        assert!(Mode::TextModel.description().contains("Text model"));
        assert!(Mode::GeometricModel.description().contains("Doorway"));
    }

    #[test]
    fn serializes_to_wire_names() {
        let json = serde_json::to_string(&Mode::GeometricModel).unwrap();
        assert_eq!(json, "\"geometric_model\"");
    }
}
