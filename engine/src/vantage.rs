//! Vantage: consolidate the territory and commit to a goal.

use vantage_types::{AuditAction, Discovery, EntityKind, Phase, VantageError, VantageSummary};

use crate::Session;

impl Session {
    /// Summarize territory, discoveries and assumptions. Reads only; the
    /// summary is kept on the session and the consolidation is audited.
    pub fn consolidate(&mut self) -> VantageSummary {
        let summary = VantageSummary::build(&self.territory, &self.discoveries, &self.assumptions);
        self.audit_log.record(AuditAction::Consolidated {
            discoveries: self.discoveries.len(),
            assumptions: self.assumptions.len(),
            threshold: self.threshold,
        });
        tracing::info!(
            session_id = %self.id,
            territory_covered = summary.territory_covered,
            threshold = summary.threshold,
            "Territory consolidated"
        );
        self.vantage_summary = Some(summary.clone());
        summary
    }

    pub fn verify_discovery(&mut self, index: usize) -> Result<Discovery, VantageError> {
        let discovery = self
            .discoveries
            .get_mut(index)
            .ok_or_else(|| VantageError::not_found(EntityKind::Discovery, index))?;
        discovery.verified = true;
        Ok(discovery.clone())
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        let goal = goal.into();
        self.audit_log.record(AuditAction::GoalSet { goal: goal.clone() });
        self.goal = Some(goal);
    }

    pub(crate) fn has_goal(&self) -> bool {
        self.goal.as_deref().is_some_and(|g| !g.trim().is_empty())
    }

    pub fn complete_vantage(&mut self) -> Result<Phase, VantageError> {
        if !self.has_goal() {
            return Err(VantageError::precondition(
                "set a goal before advancing to paths",
            ));
        }
        self.advance_phase(Phase::Paths)
    }
}
