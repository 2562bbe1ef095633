//! Id-keyed operations over stored sessions.

use std::sync::Arc;

use serde::Serialize;
use vantage_config::Settings;
use vantage_types::{
    Assumption, Calibration, Classification, DEFAULT_SIGNIFICANCE, Discovery, Edge, EntityKind,
    Mode, Node, NodeId, NodeType, Path, PathId, PathSet, Phase, Receipt, SessionId, VantageError,
    VantageSummary,
};

use crate::{
    ActiveSession, AnalysisStrategy, ChainWrapper, ExpansionOutcome, InMemorySessionStore,
    LocalChain, Session, SessionHandle, SessionStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub engine: &'static str,
    pub mode: Mode,
}

/// Every session operation, addressed by session id.
///
/// Each call holds the session's lock for its whole duration, backend round
/// trips included, so operations on one session never interleave.
pub struct VantageService {
    settings: Settings,
    mode: Mode,
    store: Arc<dyn SessionStore>,
    chain: Arc<dyn ChainWrapper>,
}

impl VantageService {
    /// Resolve the mode once from `settings`; every session started here gets it.
    #[must_use]
    pub fn new(
        settings: Settings,
        store: Arc<dyn SessionStore>,
        chain: Arc<dyn ChainWrapper>,
    ) -> Self {
        let mode = settings.mode_selector().resolve();
        tracing::info!(mode = %mode, "VantagePoint service ready");
        Self {
            settings,
            mode,
            store,
            chain,
        }
    }

    /// In-memory store and a local hash chain scoped by the configured chain name.
    #[must_use]
    pub fn with_defaults(settings: Settings) -> Self {
        let chain = LocalChain::new(settings.chain_name.clone());
        Self::new(settings, Arc::new(InMemorySessionStore::new()), Arc::new(chain))
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn health(&self) -> Health {
        Health {
            status: "ok",
            engine: "vantagepoint",
            mode: self.mode,
        }
    }

    fn handle(&self, id: &SessionId) -> Result<SessionHandle, VantageError> {
        self.store
            .get(id)
            .ok_or_else(|| VantageError::not_found(EntityKind::Session, id))
    }

    pub fn start(&self, friction: impl Into<String>) -> Result<Session, VantageError> {
        let strategy = AnalysisStrategy::for_mode(self.mode, &self.settings)?;
        let session = Session::new(friction, self.mode);
        let snapshot = session.clone();
        self.store.put(ActiveSession { session, strategy });
        Ok(snapshot)
    }

    /// Drop a session from the store.
    pub fn end(&self, id: &SessionId) -> Result<(), VantageError> {
        if self.store.delete(id) {
            Ok(())
        } else {
            Err(VantageError::not_found(EntityKind::Session, id))
        }
    }

    pub async fn snapshot(&self, id: &SessionId) -> Result<Session, VantageError> {
        let handle = self.handle(id)?;
        let active = handle.lock().await;
        Ok(active.session.clone())
    }

    pub async fn calibrate(
        &self,
        id: &SessionId,
        calibration: Calibration,
    ) -> Result<String, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        Ok(active.session.calibrate(calibration).to_string())
    }

    pub async fn complete_provocation(&self, id: &SessionId) -> Result<Phase, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.complete_provocation()
    }

    pub async fn advance_phase(&self, id: &SessionId, target: Phase) -> Result<Phase, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.advance_phase(target)
    }

    pub async fn expand(
        &self,
        id: &SessionId,
        focus: Option<&str>,
    ) -> Result<ExpansionOutcome, VantageError> {
        let handle = self.handle(id)?;
        let mut guard = handle.lock().await;
        let ActiveSession { session, strategy } = &mut *guard;
        session.expand(strategy, focus).await
    }

    /// `significance` defaults to 0.5.
    pub async fn add_node(
        &self,
        id: &SessionId,
        label: impl Into<String>,
        node_type: NodeType,
        significance: Option<f64>,
    ) -> Result<Node, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        Ok(active.session.add_node(
            label,
            node_type,
            significance.unwrap_or(DEFAULT_SIGNIFICANCE),
        ))
    }

    pub async fn add_edge(
        &self,
        id: &SessionId,
        source_id: NodeId,
        target_id: NodeId,
        label: Option<&str>,
    ) -> Result<Edge, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        Ok(active.session.add_edge(source_id, target_id, label))
    }

    pub async fn flag_significant(
        &self,
        id: &SessionId,
        node_id: NodeId,
    ) -> Result<Node, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.flag_significant(node_id)
    }

    pub async fn classify_assumption(
        &self,
        id: &SessionId,
        statement: impl Into<String>,
        classification: Classification,
        evidence: impl Into<String>,
    ) -> Result<Assumption, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        Ok(active
            .session
            .classify_assumption(statement, classification, evidence))
    }

    pub async fn consolidate(&self, id: &SessionId) -> Result<VantageSummary, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        Ok(active.session.consolidate())
    }

    pub async fn verify_discovery(
        &self,
        id: &SessionId,
        index: usize,
    ) -> Result<Discovery, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.verify_discovery(index)
    }

    pub async fn set_goal(
        &self,
        id: &SessionId,
        goal: impl Into<String>,
    ) -> Result<(), VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.set_goal(goal);
        Ok(())
    }

    pub async fn complete_vantage(&self, id: &SessionId) -> Result<Phase, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.complete_vantage()
    }

    pub async fn return_to_expedition(&self, id: &SessionId) -> Result<Phase, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.return_to_expedition()
    }

    pub async fn generate_paths(&self, id: &SessionId) -> Result<PathSet, VantageError> {
        let handle = self.handle(id)?;
        let mut guard = handle.lock().await;
        let ActiveSession { session, strategy } = &mut *guard;
        session.generate_paths(strategy).await
    }

    pub async fn commit_path(&self, id: &SessionId, path_id: PathId) -> Result<Path, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.commit_path(path_id)
    }

    pub async fn generate_receipt(&self, id: &SessionId) -> Result<Receipt, VantageError> {
        let handle = self.handle(id)?;
        let mut active = handle.lock().await;
        active.session.generate_receipt(self.chain.as_ref())
    }
}
