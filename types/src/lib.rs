//! Core domain types for VantagePoint.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The session engine, the backend clients and the binary all build on these.

mod audit;
mod error;
mod findings;
mod ids;
mod mode;
mod path;
mod phase;
mod receipt;
mod summary;
mod territory;
pub mod text;

pub use audit::{AuditAction, AuditEvent, AuditLog};
pub use error::{EntityKind, ErrorKind, VantageError};
pub use findings::{Assumption, Calibration, Classification, Discovery, convention_statements};
pub use ids::{NodeId, NodeIdError, SessionId};
pub use mode::Mode;
pub use path::{Path, PathDraft, PathId, PathSet, PathStatus, Risk};
pub use phase::Phase;
pub use receipt::{ChainInfo, PathSummary, Receipt};
pub use summary::{VantageSummary, WELL_MAPPED_THRESHOLD};
pub use territory::{
    CONSOLIDATE_THRESHOLD, Cluster, DEFAULT_EDGE_LABEL, DEFAULT_SIGNIFICANCE, Edge,
    ExpansionAdvice, GeometricStatus, Node, NodeMetadata, NodeType, TerritoryGraph, TypeCounts,
};

// ============================================================================
// API Key
// ============================================================================

/// Credential for the text-model backend.
///
/// Note: `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, treating blank input as absent.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value.trim().to_string()))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::ApiKey;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-ant-secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
        assert_eq!(key.expose_secret(), "sk-ant-secret");
    }

    #[test]
    fn blank_api_key_is_absent() {
        assert!(ApiKey::new("   ").is_none());
    }
}
