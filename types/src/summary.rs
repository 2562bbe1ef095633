use serde::Serialize;

use crate::{Assumption, Discovery, TerritoryGraph};

/// Threshold above which the territory counts as well mapped.
pub const WELL_MAPPED_THRESHOLD: f64 = 0.6;

const WELL_MAPPED: &str = "Territory well mapped. Set your goal and proceed to paths.";
const EXPAND_FURTHER: &str =
    "Consider another expedition pass; significant unknown territory remains.";

/// What can be seen from the vantage point: a read-only aggregate of the
/// territory, discoveries and assumptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VantageSummary {
    pub territory_covered: usize,
    pub ground: usize,
    pub convention: usize,
    pub unknown: usize,
    pub discoveries: Vec<Discovery>,
    pub verified_discoveries: usize,
    pub assumptions: Vec<Assumption>,
    pub threshold: f64,
    pub recommendation: String,
}

impl VantageSummary {
    #[must_use]
    pub fn build(
        territory: &TerritoryGraph,
        discoveries: &[Discovery],
        assumptions: &[Assumption],
    ) -> Self {
        let counts = territory.counts();
        let threshold = territory.threshold();
        let recommendation = if threshold > WELL_MAPPED_THRESHOLD {
            WELL_MAPPED
        } else {
            EXPAND_FURTHER
        };
        Self {
            territory_covered: counts.nodes,
            ground: counts.ground,
            convention: counts.convention,
            unknown: counts.unknown,
            discoveries: discoveries.to_vec(),
            verified_discoveries: discoveries.iter().filter(|d| d.verified).count(),
            assumptions: assumptions.to_vec(),
            threshold,
            recommendation: recommendation.to_string(),
        }
    }
}
