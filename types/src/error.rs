//! Error taxonomy shared by every session operation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::Phase;

/// Coarse error category, for callers that branch on the kind of failure
/// (e.g. to pick a response status) without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Precondition,
    InvalidTransition,
    ExternalService,
}

/// What a `NotFound` error failed to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Session,
    Node,
    Path,
    Discovery,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Session => "session",
            EntityKind::Node => "node",
            EntityKind::Path => "path",
            EntityKind::Discovery => "discovery",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VantageError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("{0}")]
    Precondition(String),
    #[error(
        "cannot go from {current} to {requested}; expected: {}",
        .expected.map_or("none", Phase::as_str)
    )]
    InvalidTransition {
        current: Phase,
        requested: Phase,
        expected: Option<Phase>,
    },
    #[error("external service error: {0}")]
    ExternalService(String),
}

impl VantageError {
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalService(message.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::ExternalService(_) => ErrorKind::ExternalService,
        }
    }
}
