use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Raw answers to the three calibration questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub what_wrong: String,
    pub how_long: String,
    pub what_right: String,
}

impl Calibration {
    /// Compose the verified friction statement for `friction`.
    #[must_use]
    pub fn friction_statement(&self, friction: &str) -> String {
        format!(
            "Friction: {friction}. Specifically: {}. Duration: {}. Target state: {}.",
            self.what_wrong, self.how_long, self.what_right
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Ground,
    Convention,
}

impl Classification {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Classification::Ground => "ground",
            Classification::Convention => "convention",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ground" => Some(Self::Ground),
            "convention" => Some(Self::Convention),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assumption {
    pub statement: String,
    pub classification: Classification,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discovery {
    pub finding: String,
    pub significance: f64,
    pub verified: bool,
    pub node_id: NodeId,
}

/// Statements of every convention-classified assumption, in order.
#[must_use]
pub fn convention_statements(assumptions: &[Assumption]) -> Vec<String> {
    assumptions
        .iter()
        .filter(|a| a.classification == Classification::Convention)
        .map(|a| a.statement.clone())
        .collect()
}
