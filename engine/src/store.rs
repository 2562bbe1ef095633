//! Session storage keyed by id.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use vantage_types::SessionId;

use crate::{AnalysisStrategy, Session};

/// A live session together with the strategy chosen for it at start.
#[derive(Debug)]
pub struct ActiveSession {
    pub session: Session,
    pub strategy: AnalysisStrategy,
}

/// Shared handle to one stored session. Holding the lock is what makes an
/// operation the session's single writer.
pub type SessionHandle = Arc<Mutex<ActiveSession>>;

pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Option<SessionHandle>;
    fn put(&self, active: ActiveSession) -> SessionHandle;
    fn delete(&self, id: &SessionId) -> bool;
}

/// Process-local store. Sessions do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn put(&self, active: ActiveSession) -> SessionHandle {
        let id = active.session.id().clone();
        let handle = Arc::new(Mutex::new(active));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&handle));
        handle
    }

    fn delete(&self, id: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }
}
