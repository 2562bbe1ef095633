//! Paths: three fixed-identity routes from the goal, then a commitment.

use vantage_providers::DoorwayResponse;
use vantage_types::{
    AuditAction, EntityKind, Path, PathDraft, PathId, PathSet, PathStatus, Phase, VantageError,
    convention_statements,
};

use crate::strategy::run_doorway;
use crate::{AnalysisStrategy, Session};

const TEXT_MODEL_CONFIDENCE: [f64; 3] = [0.5, 0.6, 0.7];
const SEE_ABOVE: &str = "See full analysis above";

#[must_use]
pub fn divergence_prompt(goal: &str, conventions: &[String]) -> String {
    format!(
        "Goal: {goal}. Break every conventional assumption: {conventions:?}. \
         What is the most divergent viable approach?"
    )
}

#[must_use]
pub fn hybrid_prompt(goal: &str, conventions: &[String]) -> String {
    format!(
        "Goal: {goal}. These are conventions (not physics): {conventions:?}. \
         Break only the ones that are clearly habit. Keep confirmed constraints. \
         What is the balanced approach?"
    )
}

#[must_use]
pub fn ground_prompt(goal: &str) -> String {
    format!(
        "Goal: {goal}. Use only confirmed ground. No conventions broken. \
         Maximum confidence path. What is the safest viable approach?"
    )
}

/// Single prompt describing all three archetypes, for the text model.
#[must_use]
pub fn combined_paths_prompt(goal: &str, conventions: &[String]) -> String {
    format!(
        "Goal: {goal}.\n\
         Known conventions (assumptions, not physics): {conventions:?}\n\n\
         Generate three approaches:\n\
         A) Maximum divergence: break every convention. Highest risk, highest potential.\n\
         B) Informed hybrid: break conventions selectively. Balanced.\n\
         C) Confirmed ground: safest path. No conventions broken.\n\n\
         For each: describe the approach, list assumptions, rate confidence (0-1), \
         rate risk (low/moderate/high)."
    )
}

fn standalone_drafts(conventions: Vec<String>) -> [PathDraft; 3] {
    [
        PathDraft::new(
            format!(
                "Break all conventions: {conventions:?}. Describe your most divergent viable approach."
            ),
            PathStatus::Standalone,
        )
        .with_assumptions(conventions),
        PathDraft::new(
            "Break conventions selectively. Keep confirmed constraints. Describe your balanced approach.",
            PathStatus::Standalone,
        ),
        PathDraft::new(
            "Use only confirmed ground. Maximum safety. Describe your safest approach.",
            PathStatus::Standalone,
        ),
    ]
}

fn text_model_drafts(answer: String, conventions: Vec<String>) -> [PathDraft; 3] {
    let [a, b, c] = TEXT_MODEL_CONFIDENCE;
    [
        PathDraft::new(answer, PathStatus::Llm)
            .with_confidence(a)
            .with_assumptions(conventions),
        PathDraft::new(SEE_ABOVE, PathStatus::Llm).with_confidence(b),
        PathDraft::new(SEE_ABOVE, PathStatus::Llm).with_confidence(c),
    ]
}

/// Draft from one Doorway answer. Bridge data, when present and allowed,
/// supplies assumptions and confidence; otherwise content confidence is used.
fn doorway_draft(
    response: &DoorwayResponse,
    raw: serde_json::Value,
    read_bridge: bool,
) -> PathDraft {
    let draft = PathDraft::new(response.answer(), response.status.into())
        .with_gap_score(response.gap_score().unwrap_or(0.0))
        .with_backend_response(raw);
    match response.bridge.as_ref().filter(|_| read_bridge) {
        Some(bridge) => draft
            .with_assumptions(bridge.assumptions.clone())
            .with_confidence(bridge.confidence.unwrap_or(0.0)),
        None => draft.with_confidence(response.content_confidence().unwrap_or(0.0)),
    }
}

impl Session {
    /// Generate paths A, B and C from the goal and the convention assumptions.
    ///
    /// Requires a goal. Replaces any earlier set only once every backend call
    /// has succeeded, so the session never holds a partial set.
    pub async fn generate_paths(
        &mut self,
        strategy: &AnalysisStrategy,
    ) -> Result<PathSet, VantageError> {
        if !self.has_goal() {
            return Err(VantageError::precondition(
                "set a goal before generating paths",
            ));
        }
        let goal = self.goal.clone().unwrap_or_default();
        let conventions = convention_statements(&self.assumptions);

        let [a, b, c] = match strategy {
            AnalysisStrategy::Standalone => standalone_drafts(conventions),
            AnalysisStrategy::TextModel(client) => {
                let completion = client
                    .complete(&combined_paths_prompt(&goal, &conventions))
                    .await;
                if !completion.success {
                    tracing::warn!(
                        session_id = %self.id,
                        answer = %completion.answer,
                        "Text model degraded during path generation"
                    );
                }
                text_model_drafts(completion.answer, conventions)
            }
            AnalysisStrategy::Geometric(client) => {
                let (response_a, raw_a) =
                    run_doorway(client, &divergence_prompt(&goal, &conventions)).await?;
                let (response_b, raw_b) =
                    run_doorway(client, &hybrid_prompt(&goal, &conventions)).await?;
                let (response_c, raw_c) = run_doorway(client, &ground_prompt(&goal)).await?;
                [
                    doorway_draft(&response_a, raw_a, true),
                    doorway_draft(&response_b, raw_b, true),
                    doorway_draft(&response_c, raw_c, false),
                ]
            }
        };

        let paths = PathSet::from_drafts(a, b, c);
        self.audit_log.record(AuditAction::PathsGenerated {
            count: paths.as_slice().len(),
        });
        tracing::info!(session_id = %self.id, mode = %self.mode, "Paths generated");
        self.paths = Some(paths.clone());
        Ok(paths)
    }

    /// Commit to one generated path and move to the receipt phase.
    ///
    /// Fails with `NotFound` before any paths exist, and with
    /// `InvalidTransition` outside the paths phase.
    pub fn commit_path(&mut self, path_id: PathId) -> Result<Path, VantageError> {
        let chosen = self
            .paths
            .as_ref()
            .map(|set| set.get(path_id).clone())
            .ok_or_else(|| VantageError::not_found(EntityKind::Path, path_id))?;
        self.phase.advance_to(Phase::Receipt)?;

        self.audit_log.record(AuditAction::PathCommitted {
            path_id,
            label: chosen.label.clone(),
        });
        self.chosen_path = Some(chosen.clone());
        self.advance_phase(Phase::Receipt)?;
        tracing::info!(session_id = %self.id, path_id = %path_id, "Path committed");
        Ok(chosen)
    }
}
