//! Core engine for VantagePoint: the phase state machine and everything it drives.
//!
//! A [`Session`] walks five phases in a fixed order:
//!
//! ```text
//! provocation -> expedition -> vantage -> paths -> receipt
//!                    ^            |
//!                    +------------+  return_to_expedition
//! ```
//!
//! Sync operations are methods on [`Session`]. The two that consult an
//! analysis backend (`expand`, `generate_paths`) also take the session's
//! [`AnalysisStrategy`], chosen once from the session's [`Mode`].
//! [`VantageService`] wraps all of it behind session ids, a [`SessionStore`]
//! and a [`ChainWrapper`].
//!
//! Every operation validates before it mutates: a failed call leaves the
//! session, including its audit log, unchanged.

mod expedition;
mod paths;
mod provocation;
mod receipt;
mod service;
mod session;
mod store;
mod strategy;
mod vantage;

pub use expedition::{ExpansionOutcome, MANUAL_EXPANSION_INSTRUCTION, build_expansion_prompt};
pub use paths::{combined_paths_prompt, divergence_prompt, ground_prompt, hybrid_prompt};
pub use receipt::{ChainWrapper, LocalChain, chain_name_for};
pub use service::{Health, VantageService};
pub use session::Session;
pub use store::{ActiveSession, InMemorySessionStore, SessionHandle, SessionStore};
pub use strategy::AnalysisStrategy;

pub use vantage_types::{
    Assumption, AuditAction, AuditEvent, AuditLog, Calibration, ChainInfo, Classification,
    Discovery, Edge, EntityKind, ErrorKind, ExpansionAdvice, Mode, Node, NodeId, NodeType, Path,
    PathId, PathSet, Phase, Receipt, SessionId, TerritoryGraph, VantageError, VantageSummary,
};
