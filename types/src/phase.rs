//! The five-phase session lifecycle.
//!
//! One fixed forward chain (`provocation → expedition → vantage → paths →
//! receipt`) plus a single sanctioned backward edge from `vantage` to
//! `expedition`. Every other edge is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::VantageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Provocation,
    Expedition,
    Vantage,
    Paths,
    Receipt,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Provocation,
        Phase::Expedition,
        Phase::Vantage,
        Phase::Paths,
        Phase::Receipt,
    ];

    /// The registered successor, or `None` for the terminal phase.
    #[must_use]
    pub const fn successor(self) -> Option<Phase> {
        match self {
            Phase::Provocation => Some(Phase::Expedition),
            Phase::Expedition => Some(Phase::Vantage),
            Phase::Vantage => Some(Phase::Paths),
            Phase::Paths => Some(Phase::Receipt),
            Phase::Receipt => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Provocation => "provocation",
            Phase::Expedition => "expedition",
            Phase::Vantage => "vantage",
            Phase::Paths => "paths",
            Phase::Receipt => "receipt",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == value.trim().to_ascii_lowercase())
    }

    /// Validate a forward move. Only the registered successor is accepted,
    /// which rules out both skipping ahead and moving backward.
    pub fn advance_to(self, target: Phase) -> Result<Phase, VantageError> {
        match self.successor() {
            Some(expected) if expected == target => Ok(target),
            expected => Err(VantageError::InvalidTransition {
                current: self,
                requested: target,
                expected,
            }),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Phase;
    use crate::{ErrorKind, VantageError};

    #[test]
    fn forward_chain_follows_successor_table() {
        let mut phase = Phase::Provocation;
        for target in [Phase::Expedition, Phase::Vantage, Phase::Paths, Phase::Receipt] {
            phase = phase.advance_to(target).unwrap();
        }
        assert_eq!(phase, Phase::Receipt);
    }

    #[test]
    fn every_non_successor_target_is_rejected() {
        for current in Phase::ALL {
            for target in Phase::ALL {
                let result = current.advance_to(target);
                if current.successor() == Some(target) {
                    assert_eq!(result.unwrap(), target);
                } else {
                    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidTransition);
                }
            }
        }
    }

    #[test]
    fn skipping_ahead_names_expected_phase() {
        let err = Phase::Provocation.advance_to(Phase::Vantage).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("provocation"));
        assert!(message.contains("expected: expedition"));
        assert!(matches!(
            err,
            VantageError::InvalidTransition {
                expected: Some(Phase::Expedition),
                ..
            }
        ));
    }

    #[test]
    fn terminal_phase_has_no_successor() {
        let err = Phase::Receipt.advance_to(Phase::Receipt).unwrap_err();
        assert!(err.to_string().contains("expected: none"));
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for phase in Phase::ALL {
            assert_eq!(Phase::parse(phase.as_str()), Some(phase));
        }
        assert_eq!(Phase::parse("Vantage"), Some(Phase::Vantage));
        assert_eq!(Phase::parse("summit"), None);
    }
}
