//! Expedition: map the territory around the friction.

use serde::Serialize;
use serde_json::Value;
use vantage_providers::DoorwayResponse;
use vantage_types::text::truncate_chars;
use vantage_types::{
    Assumption, AuditAction, Classification, DEFAULT_EDGE_LABEL, Discovery, Edge, EntityKind,
    ExpansionAdvice, Node, NodeId, NodeMetadata, NodeType, TerritoryGraph, VantageError,
};

use crate::strategy::run_doorway;
use crate::{AnalysisStrategy, Session};

/// Given back to the user in standalone mode alongside the expansion prompt.
pub const MANUAL_EXPANSION_INSTRUCTION: &str = "Analyze this and identify: known facts (ground), \
     assumptions treated as fact (convention), and genuinely unknown areas. \
     Then add a node for each finding.";

const NODE_LABEL_MAX_CHARS: usize = 120;
const TEXT_MODEL_NODE_SIGNIFICANCE: f64 = 0.5;
const BRIDGE_NODE_SIGNIFICANCE: f64 = 0.6;
const CONFLICT_NODE_SIGNIFICANCE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExpansionOutcome {
    /// Standalone: nothing changed; the user analyzes the prompt.
    Manual { prompt: String, instruction: String },
    Expanded {
        nodes_added: Vec<Node>,
        edges_added: Vec<Edge>,
        threshold: f64,
        recommendation: ExpansionAdvice,
    },
}

/// A node a backend proposed, linked from the first node in its batch.
struct ProposedNode {
    label: String,
    node_type: NodeType,
    significance: f64,
    metadata: Option<NodeMetadata>,
    link: Option<&'static str>,
}

impl ProposedNode {
    fn new(label: impl Into<String>, node_type: NodeType, significance: f64) -> Self {
        Self {
            label: label.into(),
            node_type,
            significance,
            metadata: None,
            link: None,
        }
    }

    fn linked(mut self, label: &'static str) -> Self {
        self.link = Some(label);
        self
    }
}

/// Prompt asking a backend (or the user) to expand the territory.
#[must_use]
pub fn build_expansion_prompt(
    friction_statement: Option<&str>,
    focus: Option<&str>,
    territory: &TerritoryGraph,
) -> String {
    let mut prompt = format!("Problem space: {}", friction_statement.unwrap_or_default());
    if let Some(focus) = focus.filter(|f| !f.trim().is_empty()) {
        prompt.push_str(&format!("\n\nFocus area: {focus}"));
    }
    if !territory.nodes().is_empty() {
        prompt.push_str(&format!(
            "\n\nAlready mapped. Ground: {:?}. Convention: {:?}. Unknown: {:?}.",
            territory.labels_of(NodeType::Ground),
            territory.labels_of(NodeType::Convention),
            territory.labels_of(NodeType::Unknown),
        ));
    }
    prompt.push_str(
        "\n\nExpand the territory. Identify what is genuinely known (ground), \
         what is assumed without evidence (convention), and what is genuinely unknown. \
         For each finding, state whether it is ground, convention, or unknown.",
    );
    prompt
}

/// Nodes for one Doorway answer: the answer itself, one convention node per
/// bridged assumption, and an unknown node for a flagged conflict.
fn doorway_nodes(response: &DoorwayResponse) -> Vec<ProposedNode> {
    let mut main = ProposedNode::new(
        truncate_chars(response.answer(), NODE_LABEL_MAX_CHARS),
        response.status.node_type(),
        response.significance(),
    );
    main.metadata = Some(NodeMetadata {
        doorway_status: response.status,
        shape: response.shape().to_string(),
        gap_score: response
            .gap_score()
            .unwrap_or(vantage_providers::doorway::DEFAULT_GAP_SCORE),
    });

    let mut nodes = vec![main];
    nodes.extend(response.bridge_assumptions().iter().map(|assumption| {
        ProposedNode::new(assumption.clone(), NodeType::Convention, BRIDGE_NODE_SIGNIFICANCE)
            .linked("assumes")
    }));
    if let Some(message) = response.conflict_message() {
        nodes.push(
            ProposedNode::new(message, NodeType::Unknown, CONFLICT_NODE_SIGNIFICANCE)
                .linked("conflicts"),
        );
    }
    nodes
}

impl Session {
    /// Insert a node by hand. Used in every mode; the only way to grow the
    /// territory in standalone mode.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        node_type: NodeType,
        significance: f64,
    ) -> Node {
        let node = self
            .territory
            .add_node(label, node_type, significance, None)
            .clone();
        self.refresh_threshold();
        tracing::debug!(
            session_id = %self.id,
            node_id = %node.id,
            node_type = node.node_type.as_str(),
            threshold = self.threshold,
            "Node added"
        );
        node
    }

    /// Append an edge. Endpoints are not validated against the node set.
    pub fn add_edge(&mut self, source_id: NodeId, target_id: NodeId, label: Option<&str>) -> Edge {
        self.territory
            .add_edge(source_id, target_id, label.unwrap_or(DEFAULT_EDGE_LABEL))
            .clone()
    }

    /// Force a node's significance to 1.0 and record it as a new discovery.
    ///
    /// Every call records a discovery, including repeat flags of the same node.
    pub fn flag_significant(&mut self, node_id: NodeId) -> Result<Node, VantageError> {
        let node = self
            .territory
            .mark_significant(node_id)
            .cloned()
            .ok_or_else(|| VantageError::not_found(EntityKind::Node, node_id))?;
        self.discoveries.push(Discovery {
            finding: node.label.clone(),
            significance: 1.0,
            verified: false,
            node_id,
        });
        tracing::debug!(session_id = %self.id, node_id = %node_id, "Node flagged significant");
        Ok(node)
    }

    pub fn classify_assumption(
        &mut self,
        statement: impl Into<String>,
        classification: Classification,
        evidence: impl Into<String>,
    ) -> Assumption {
        let assumption = Assumption {
            statement: statement.into(),
            classification,
            evidence: evidence.into(),
        };
        self.assumptions.push(assumption.clone());
        self.audit_log.record(AuditAction::AssumptionClassified {
            data: assumption.clone(),
        });
        assumption
    }

    /// Expand the territory through the session's strategy.
    ///
    /// Backend calls happen before any mutation, so a failed geometric call
    /// leaves the session unchanged.
    pub async fn expand(
        &mut self,
        strategy: &AnalysisStrategy,
        focus: Option<&str>,
    ) -> Result<ExpansionOutcome, VantageError> {
        let prompt = build_expansion_prompt(self.friction_statement(), focus, &self.territory);
        tracing::debug!(
            session_id = %self.id,
            prompt_chars = prompt.chars().count(),
            "Expanding territory"
        );

        let (proposed, raw) = match strategy {
            AnalysisStrategy::Standalone => {
                return Ok(ExpansionOutcome::Manual {
                    prompt,
                    instruction: MANUAL_EXPANSION_INSTRUCTION.to_string(),
                });
            }
            AnalysisStrategy::TextModel(client) => {
                let completion = client.complete(&prompt).await;
                if !completion.success {
                    tracing::warn!(
                        session_id = %self.id,
                        answer = %completion.answer,
                        "Text model degraded during expansion"
                    );
                }
                let node = ProposedNode::new(
                    truncate_chars(&completion.answer, NODE_LABEL_MAX_CHARS),
                    NodeType::Convention,
                    TEXT_MODEL_NODE_SIGNIFICANCE,
                );
                (vec![node], None)
            }
            AnalysisStrategy::Geometric(client) => {
                let (response, raw) = run_doorway(client, &prompt).await?;
                (doorway_nodes(&response), Some(raw))
            }
        };

        Ok(self.apply_expansion(focus, proposed, raw))
    }

    fn apply_expansion(
        &mut self,
        focus: Option<&str>,
        proposed: Vec<ProposedNode>,
        raw: Option<Value>,
    ) -> ExpansionOutcome {
        let mut nodes_added: Vec<Node> = Vec::with_capacity(proposed.len());
        let mut edges_added = Vec::new();

        for candidate in proposed {
            let node = self
                .territory
                .add_node(
                    candidate.label,
                    candidate.node_type,
                    candidate.significance,
                    candidate.metadata,
                )
                .clone();
            if let (Some(label), Some(main)) = (candidate.link, nodes_added.first()) {
                edges_added.push(self.territory.add_edge(main.id, node.id, label).clone());
            }
            nodes_added.push(node);
        }

        if let Some(raw) = raw {
            self.backend_responses.push(raw);
        }
        self.refresh_threshold();
        let recommendation = ExpansionAdvice::from_threshold(self.threshold);
        self.audit_log.record(AuditAction::TerritoryExpanded {
            focus: focus.map(str::to_string),
            nodes_added: nodes_added.len(),
            threshold: self.threshold,
            recommendation,
        });
        tracing::info!(
            session_id = %self.id,
            nodes_added = nodes_added.len(),
            edges_added = edges_added.len(),
            threshold = self.threshold,
            "Territory expanded"
        );

        ExpansionOutcome::Expanded {
            nodes_added,
            edges_added,
            threshold: self.threshold,
            recommendation,
        }
    }
}

#[cfg(test)]
mod tests {
    use vantage_types::{Classification, ErrorKind, Mode, NodeId, NodeType, TerritoryGraph};

    use super::{ExpansionOutcome, MANUAL_EXPANSION_INSTRUCTION, build_expansion_prompt};
    use crate::{AnalysisStrategy, Session};

    fn session() -> Session {
        Session::new("deploys break", Mode::Standalone)
    }

    #[test]
    fn threshold_tracks_ground_share() {
        let mut session = session();
        session.add_node("Jenkins is stable", NodeType::Ground, 0.5);
        assert!((session.threshold() - 1.0).abs() < f64::EPSILON);
        session.add_node("staging is required", NodeType::Convention, 0.5);
        assert!((session.threshold() - 0.5).abs() < f64::EPSILON);
        session.add_node("root cause", NodeType::Unknown, 0.5);
        assert!((session.threshold() - 0.333).abs() < f64::EPSILON);
    }

    #[test]
    fn edges_do_not_touch_threshold() {
        let mut session = session();
        let a = session.add_node("a", NodeType::Ground, 0.5).id;
        let b = session.add_node("b", NodeType::Unknown, 0.5).id;
        let before = session.threshold();
        let edge = session.add_edge(a, b, None);
        assert_eq!(edge.label, "related");
        assert!((session.threshold() - before).abs() < f64::EPSILON);
    }

    #[test]
    fn dangling_edges_are_accepted() {
        let mut session = session();
        let ghost = NodeId::try_new(99).unwrap();
        let edge = session.add_edge(ghost, ghost, Some("assumes"));
        assert_eq!(edge.label, "assumes");
        assert_eq!(session.territory().edges().len(), 1);
    }

    #[test]
    fn flag_significant_records_a_discovery_each_time() {
        let mut session = session();
        let id = session.add_node("staging gate", NodeType::Convention, 0.2).id;
        let node = session.flag_significant(id).unwrap();
        assert!((node.significance - 1.0).abs() < f64::EPSILON);
        session.flag_significant(id).unwrap();

        assert_eq!(session.discoveries().len(), 2);
        let discovery = &session.discoveries()[0];
        assert_eq!(discovery.finding, "staging gate");
        assert!(!discovery.verified);
        assert_eq!(discovery.node_id, id);
    }

    #[test]
    fn flag_unknown_node_is_not_found() {
        let mut session = session();
        let err = session.flag_significant(NodeId::try_new(7).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(session.discoveries().is_empty());
    }

    #[test]
    fn classify_assumption_appends_without_touching_graph() {
        let mut session = session();
        session.classify_assumption("staging is required", Classification::Convention, "");
        assert_eq!(session.assumptions().len(), 1);
        assert!(session.territory().nodes().is_empty());
        assert_eq!(session.audit_log().len(), 1);
    }

    #[test]
    fn prompt_lists_mapped_labels_and_focus() {
        let mut territory = TerritoryGraph::new();
        territory.add_node("Jenkins is stable", NodeType::Ground, 0.5, None);
        territory.add_node("staging is required", NodeType::Convention, 0.5, None);
        let prompt = build_expansion_prompt(Some("Friction: x."), Some("CI"), &territory);
        assert!(prompt.starts_with("Problem space: Friction: x."));
        assert!(prompt.contains("\n\nFocus area: CI"));
        assert!(prompt.contains(r#"Ground: ["Jenkins is stable"]. Convention: ["staging is required"]. Unknown: []."#));
        assert!(prompt.ends_with("state whether it is ground, convention, or unknown."));
    }

    #[test]
    fn prompt_skips_empty_sections() {
        let prompt = build_expansion_prompt(Some("Friction: x."), None, &TerritoryGraph::new());
        assert!(!prompt.contains("Focus area"));
        assert!(!prompt.contains("Already mapped"));
    }

    #[tokio::test]
    async fn standalone_expand_returns_prompt_without_mutation() {
        let mut session = session();
        session.add_node("known", NodeType::Ground, 0.5);
        let outcome = session
            .expand(&AnalysisStrategy::Standalone, Some("deploy pipeline"))
            .await
            .unwrap();
        match outcome {
            ExpansionOutcome::Manual {
                prompt,
                instruction,
            } => {
                assert!(prompt.contains("Focus area: deploy pipeline"));
                assert_eq!(instruction, MANUAL_EXPANSION_INSTRUCTION);
            }
            ExpansionOutcome::Expanded { .. } => panic!("standalone must not expand"),
        }
        assert_eq!(session.territory().nodes().len(), 1);
        assert!(session.audit_log().is_empty());
    }
}
