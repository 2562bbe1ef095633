//! Append-only audit history underlying the session receipt.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Assumption, Calibration, ExpansionAdvice, PathId, Phase};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    Calibrated {
        data: Calibration,
        output: String,
    },
    TerritoryExpanded {
        focus: Option<String>,
        nodes_added: usize,
        threshold: f64,
        recommendation: ExpansionAdvice,
    },
    AssumptionClassified {
        data: Assumption,
    },
    Consolidated {
        discoveries: usize,
        assumptions: usize,
        threshold: f64,
    },
    GoalSet {
        goal: String,
    },
    ReturnedToExpedition,
    PathsGenerated {
        count: usize,
    },
    PathCommitted {
        path_id: PathId,
        label: String,
    },
    ReceiptGenerated {
        chain_id: String,
    },
}

impl AuditAction {
    /// Phase the action belongs to, independent of the session's current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Calibrated { .. } => Phase::Provocation,
            Self::TerritoryExpanded { .. } | Self::AssumptionClassified { .. } => Phase::Expedition,
            Self::Consolidated { .. } | Self::GoalSet { .. } | Self::ReturnedToExpedition => {
                Phase::Vantage
            }
            Self::PathsGenerated { .. } | Self::PathCommitted { .. } => Phase::Paths,
            Self::ReceiptGenerated { .. } => Phase::Receipt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub at: DateTime<Utc>,
    pub phase: Phase,
    #[serde(flatten)]
    pub action: AuditAction,
}

/// Ordered event history. Events can be appended and read, never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AuditLog(Vec<AuditEvent>);

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: AuditAction) {
        self.0.push(AuditEvent {
            at: Utc::now(),
            phase: action.phase(),
            action,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[AuditEvent] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&AuditEvent> {
        self.0.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditAction, AuditLog};
    use crate::{PathId, Phase};

    #[test]
    fn events_keep_insertion_order_and_phase() {
        let mut log = AuditLog::new();
        log.record(AuditAction::GoalSet { goal: "ship".into() });
        log.record(AuditAction::PathsGenerated { count: 3 });
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].phase, Phase::Vantage);
        assert_eq!(log.events()[1].phase, Phase::Paths);
        assert!(log.events()[0].at <= log.events()[1].at);
    }

    #[test]
    fn serializes_flat_with_action_tag() {
        let mut log = AuditLog::new();
        log.record(AuditAction::PathCommitted {
            path_id: PathId::C,
            label: "Confirmed ground".into(),
        });
        log.record(AuditAction::ReturnedToExpedition);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["phase"], "paths");
        assert_eq!(json[0]["action"], "path_committed");
        assert_eq!(json[0]["path_id"], "C");
        assert_eq!(json[1]["action"], "returned_to_expedition");
        assert_eq!(json[1]["phase"], "vantage");
        assert!(json[0]["at"].is_string());
    }
}
