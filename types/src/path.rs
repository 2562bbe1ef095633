//! Candidate solution paths.
//!
//! Paths are only ever produced as a complete `PathSet` of three with fixed
//! identity: A is maximum divergence (high risk), B the informed hybrid
//! (moderate risk), C confirmed ground (low risk). Identity, label and risk
//! come from the [`PathId`], never from backend output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GeometricStatus;
use crate::territory::clamp_unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathId {
    A,
    B,
    C,
}

impl PathId {
    pub const ALL: [PathId; 3] = [PathId::A, PathId::B, PathId::C];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PathId::A => "Maximum divergence",
            PathId::B => "Informed hybrid",
            PathId::C => "Confirmed ground",
        }
    }

    #[must_use]
    pub const fn risk(self) -> Risk {
        match self {
            PathId::A => Risk::High,
            PathId::B => Risk::Moderate,
            PathId::C => Risk::Low,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PathId::A => "A",
            PathId::B => "B",
            PathId::C => "C",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "A" | "a" => Some(PathId::A),
            "B" | "b" => Some(PathId::B),
            "C" | "c" => Some(PathId::C),
            _ => None,
        }
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Moderate,
    High,
}

impl Risk {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Moderate => "moderate",
            Risk::High => "high",
        }
    }
}

/// Which strategy produced a path, or the geometric backend's verdict on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathStatus {
    Standalone,
    Llm,
    Ground,
    Bridge,
    Conflict,
    Provisional,
}

impl From<GeometricStatus> for PathStatus {
    fn from(status: GeometricStatus) -> Self {
        match status {
            GeometricStatus::Ground => PathStatus::Ground,
            GeometricStatus::Bridge => PathStatus::Bridge,
            GeometricStatus::Conflict => PathStatus::Conflict,
            GeometricStatus::Provisional => PathStatus::Provisional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub path_id: PathId,
    pub label: String,
    pub description: String,
    pub risk: Risk,
    pub confidence: f64,
    pub assumptions: Vec<String>,
    pub status: PathStatus,
    pub gap_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_response: Option<serde_json::Value>,
}

/// Strategy-supplied content for one path, before identity is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDraft {
    pub description: String,
    pub confidence: f64,
    pub assumptions: Vec<String>,
    pub status: PathStatus,
    pub gap_score: f64,
    pub backend_response: Option<serde_json::Value>,
}

impl PathDraft {
    #[must_use]
    pub fn new(description: impl Into<String>, status: PathStatus) -> Self {
        Self {
            description: description.into(),
            confidence: 0.0,
            assumptions: Vec::new(),
            status,
            gap_score: 0.0,
            backend_response: None,
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_assumptions(mut self, assumptions: Vec<String>) -> Self {
        self.assumptions = assumptions;
        self
    }

    #[must_use]
    pub fn with_gap_score(mut self, gap_score: f64) -> Self {
        self.gap_score = gap_score;
        self
    }

    #[must_use]
    pub fn with_backend_response(mut self, response: serde_json::Value) -> Self {
        self.backend_response = Some(response);
        self
    }

    fn into_path(self, path_id: PathId) -> Path {
        Path {
            path_id,
            label: path_id.label().to_string(),
            description: self.description,
            risk: path_id.risk(),
            confidence: clamp_unit(self.confidence),
            assumptions: self.assumptions,
            status: self.status,
            gap_score: self.gap_score,
            backend_response: self.backend_response,
        }
    }
}

/// Exactly three paths, ordered A, B, C.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PathSet([Path; 3]);

impl PathSet {
    #[must_use]
    pub fn from_drafts(a: PathDraft, b: PathDraft, c: PathDraft) -> Self {
        Self([
            a.into_path(PathId::A),
            b.into_path(PathId::B),
            c.into_path(PathId::C),
        ])
    }

    #[must_use]
    pub fn get(&self, id: PathId) -> &Path {
        match id {
            PathId::A => &self.0[0],
            PathId::B => &self.0[1],
            PathId::C => &self.0[2],
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Path] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
