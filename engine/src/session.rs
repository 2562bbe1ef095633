//! The session aggregate and its phase transitions.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use vantage_types::{
    Assumption, AuditAction, AuditLog, Calibration, Discovery, Mode, Path, PathSet, Phase,
    SessionId, TerritoryGraph, VantageError, VantageSummary,
};

/// One walk through the method, from friction to receipt.
///
/// Fields are only reachable through the operations in this crate, which
/// keeps the phase order, the threshold and the audit log consistent.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) mode: Mode,
    pub(crate) phase: Phase,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) friction: String,
    pub(crate) friction_statement: Option<String>,
    pub(crate) calibration: Option<Calibration>,
    pub(crate) territory: TerritoryGraph,
    pub(crate) discoveries: Vec<Discovery>,
    pub(crate) assumptions: Vec<Assumption>,
    pub(crate) threshold: f64,
    pub(crate) goal: Option<String>,
    pub(crate) vantage_summary: Option<VantageSummary>,
    #[serde(serialize_with = "serialize_paths")]
    pub(crate) paths: Option<PathSet>,
    pub(crate) chosen_path: Option<Path>,
    pub(crate) backend_responses: Vec<Value>,
    pub(crate) audit_log: AuditLog,
}

fn serialize_paths<S>(paths: &Option<PathSet>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match paths {
        Some(set) => set.serialize(serializer),
        None => serializer.collect_seq(std::iter::empty::<&Path>()),
    }
}

impl Session {
    /// Create a session in the provocation phase. `mode` is fixed for its lifetime.
    #[must_use]
    pub fn new(friction: impl Into<String>, mode: Mode) -> Self {
        Self::with_id(SessionId::generate(), friction, mode)
    }

    #[must_use]
    pub fn with_id(id: SessionId, friction: impl Into<String>, mode: Mode) -> Self {
        let session = Self {
            id,
            mode,
            phase: Phase::Provocation,
            created_at: Utc::now(),
            friction: friction.into(),
            friction_statement: None,
            calibration: None,
            territory: TerritoryGraph::new(),
            discoveries: Vec::new(),
            assumptions: Vec::new(),
            threshold: 0.0,
            goal: None,
            vantage_summary: None,
            paths: None,
            chosen_path: None,
            backend_responses: Vec::new(),
            audit_log: AuditLog::new(),
        };
        tracing::info!(
            session_id = %session.id,
            mode = %session.mode,
            "Session started"
        );
        session
    }

    /// Move to `target`, which must be the registered successor of the current phase.
    pub fn advance_phase(&mut self, target: Phase) -> Result<Phase, VantageError> {
        let next = self.phase.advance_to(target)?;
        tracing::info!(
            session_id = %self.id,
            from = %self.phase,
            to = %next,
            "Phase advanced"
        );
        self.phase = next;
        Ok(next)
    }

    /// The one sanctioned backward move: vantage back to expedition for another pass.
    pub fn return_to_expedition(&mut self) -> Result<Phase, VantageError> {
        if self.phase != Phase::Vantage {
            return Err(VantageError::InvalidTransition {
                current: self.phase,
                requested: Phase::Expedition,
                expected: self.phase.successor(),
            });
        }
        self.phase = Phase::Expedition;
        self.audit_log.record(AuditAction::ReturnedToExpedition);
        tracing::info!(session_id = %self.id, "Returned to expedition");
        Ok(self.phase)
    }

    pub(crate) fn refresh_threshold(&mut self) {
        self.threshold = self.territory.threshold();
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn friction(&self) -> &str {
        &self.friction
    }

    #[must_use]
    pub fn friction_statement(&self) -> Option<&str> {
        self.friction_statement.as_deref()
    }

    #[must_use]
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    #[must_use]
    pub fn territory(&self) -> &TerritoryGraph {
        &self.territory
    }

    #[must_use]
    pub fn discoveries(&self) -> &[Discovery] {
        &self.discoveries
    }

    #[must_use]
    pub fn assumptions(&self) -> &[Assumption] {
        &self.assumptions
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    #[must_use]
    pub fn vantage_summary(&self) -> Option<&VantageSummary> {
        self.vantage_summary.as_ref()
    }

    /// Generated paths: empty, or exactly A, B and C.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        self.paths.as_ref().map_or(&[][..], PathSet::as_slice)
    }

    #[must_use]
    pub fn chosen_path(&self) -> Option<&Path> {
        self.chosen_path.as_ref()
    }

    /// Raw geometric responses received while expanding the territory.
    #[must_use]
    pub fn backend_responses(&self) -> &[Value] {
        &self.backend_responses
    }

    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }
}
