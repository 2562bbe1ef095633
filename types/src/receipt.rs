use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Assumption, AuditLog, Discovery, Mode, PathId, Risk, SessionId, TypeCounts};

/// Verification record returned by the chain wrapper, embedded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    pub chain_id: String,
    pub chain_root: String,
    pub chain_length: usize,
    pub chain_verified: bool,
    pub receipt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSummary {
    pub path_id: PathId,
    pub label: String,
    pub risk: Risk,
}

/// Final, externally verifiable summary of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub session_id: SessionId,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    pub friction: String,
    pub friction_statement: Option<String>,
    pub territory: TypeCounts,
    pub discoveries: Vec<Discovery>,
    pub assumptions: Vec<Assumption>,
    pub goal: Option<String>,
    pub paths: Vec<PathSummary>,
    pub chosen_path: Option<PathId>,
    pub chain: ChainInfo,
    pub audit_log: AuditLog,
}
