//! Territory graph: the node/edge/cluster map built during expedition.
//!
//! The graph caches its threshold (fraction of ground nodes) and refreshes it
//! on node insertion only; edges and significance changes do not move it.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Threshold above which expansion recommends moving on to consolidation.
pub const CONSOLIDATE_THRESHOLD: f64 = 0.7;

/// Significance given to nodes when the caller does not specify one.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.5;

/// Edge label used when the caller does not specify one.
pub const DEFAULT_EDGE_LABEL: &str = "related";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Verified fact.
    Ground,
    /// Habit or assumption treated as fact without evidence.
    Convention,
    /// Genuinely unresolved.
    Unknown,
}

impl NodeType {
    pub const ALL: [NodeType; 3] = [NodeType::Ground, NodeType::Convention, NodeType::Unknown];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeType::Ground => "ground",
            NodeType::Convention => "convention",
            NodeType::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Classification reported by the geometric backend for one analysis.
///
/// Absent status means `Provisional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeometricStatus {
    Ground,
    Bridge,
    Conflict,
    #[default]
    Provisional,
}

impl GeometricStatus {
    /// Node type a result with this status is recorded as.
    #[must_use]
    pub const fn node_type(self) -> NodeType {
        match self {
            GeometricStatus::Ground => NodeType::Ground,
            GeometricStatus::Bridge => NodeType::Convention,
            GeometricStatus::Conflict | GeometricStatus::Provisional => NodeType::Unknown,
        }
    }
}

/// Backend provenance attached to nodes produced by the geometric strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetadata {
    pub doorway_status: GeometricStatus,
    pub shape: String,
    pub gap_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub significance: f64,
    #[serde(flatten)]
    pub metadata: Option<NodeMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub label: String,
}

/// Reserved grouping of existing nodes. No current operation creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    pub node_ids: Vec<NodeId>,
}

/// Node counts per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub nodes: usize,
    pub ground: usize,
    pub convention: usize,
    pub unknown: usize,
}

/// What the threshold says about the current expedition pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionAdvice {
    Consolidate,
    Continue,
}

impl ExpansionAdvice {
    #[must_use]
    pub fn from_threshold(threshold: f64) -> Self {
        if threshold > CONSOLIDATE_THRESHOLD {
            Self::Consolidate
        } else {
            Self::Continue
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TerritoryGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    clusters: Vec<Cluster>,
    threshold: f64,
    #[serde(skip)]
    next_id: NodeId,
}

impl Default for TerritoryGraph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            threshold: 0.0,
            next_id: NodeId::first(),
        }
    }
}

impl TerritoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under a freshly allocated id and refresh the threshold.
    ///
    /// Significance is clamped into `[0, 1]`; NaN is recorded as `0`.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        node_type: NodeType,
        significance: f64,
        metadata: Option<NodeMetadata>,
    ) -> &Node {
        let id = self.next_id;
        self.next_id = id.next();
        self.nodes.push(Node {
            id,
            label: label.into(),
            node_type,
            significance: clamp_unit(significance),
            metadata,
        });
        self.threshold = compute_threshold(&self.nodes);
        let index = self.nodes.len() - 1;
        &self.nodes[index]
    }

    /// Append an edge. Endpoints are not checked against the node set.
    pub fn add_edge(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
        label: impl Into<String>,
    ) -> &Edge {
        self.edges.push(Edge {
            source_id,
            target_id,
            label: label.into(),
        });
        let index = self.edges.len() - 1;
        &self.edges[index]
    }

    /// Force a node's significance to `1.0`. Returns `None` for unknown ids.
    pub fn mark_significant(&mut self, id: NodeId) -> Option<&Node> {
        let node = self.nodes.iter_mut().find(|node| node.id == id)?;
        node.significance = 1.0;
        Some(&*node)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Fraction of nodes classified ground, rounded to three decimals.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn counts(&self) -> TypeCounts {
        let mut counts = TypeCounts {
            nodes: self.nodes.len(),
            ..TypeCounts::default()
        };
        for node in &self.nodes {
            match node.node_type {
                NodeType::Ground => counts.ground += 1,
                NodeType::Convention => counts.convention += 1,
                NodeType::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// Labels of every node of `node_type`, in insertion order.
    #[must_use]
    pub fn labels_of(&self, node_type: NodeType) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.node_type == node_type)
            .map(|node| node.label.as_str())
            .collect()
    }
}

fn compute_threshold(nodes: &[Node]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    let ground = nodes
        .iter()
        .filter(|node| node.node_type == NodeType::Ground)
        .count();
    round3(ground as f64 / nodes.len() as f64)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
