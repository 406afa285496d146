//! Application state for the HTTP service.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use rostersync::{DataTable, IdentityStore, Roster, RosterSync, SyncResult};

/// Uploads kept in memory before the oldest is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 32;

/// An uploaded CSV and the last sync run against it.
#[derive(Debug, Clone)]
pub struct Session {
    pub file_name: String,
    pub table: Arc<DataTable>,
    pub last_result: Option<SyncResult>,
    /// Upload order; assigned when the session is stored.
    sequence: u64,
}

impl Session {
    pub fn new(file_name: String, table: DataTable) -> Self {
        Self {
            file_name,
            table: Arc::new(table),
            last_result: None,
            sequence: 0,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<RosterSync>,
    /// Users already known to the identity store.
    pub roster: Arc<Roster>,
    /// Live identity store; `None` means every execute is a dry run.
    pub store: Option<Arc<dyn IdentityStore>>,
    /// Whether execute requests may write to the store.
    pub allow_execute: bool,
    /// Uploaded datasets keyed by session id.
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub max_sessions: usize,
}

impl AppState {
    pub fn new(
        sync: RosterSync,
        roster: Roster,
        store: Option<Arc<dyn IdentityStore>>,
        allow_execute: bool,
    ) -> Self {
        Self {
            sync: Arc::new(sync),
            roster: Arc::new(roster),
            store,
            allow_execute,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Whether a request asking for a live sync will get one.
    pub fn live_sync_enabled(&self) -> bool {
        self.allow_execute && self.store.is_some()
    }

    /// Table of an uploaded session.
    pub async fn table(&self, session_id: &str) -> Option<Arc<DataTable>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| Arc::clone(&s.table))
    }

    /// Store an upload, dropping the oldest sessions beyond `max_sessions`.
    /// Re-uploading the same bytes replaces the session.
    pub async fn insert_session(&self, session_id: String, mut session: Session) {
        let mut sessions = self.sessions.write().await;
        session.sequence = sessions
            .values()
            .map(|s| s.sequence + 1)
            .max()
            .unwrap_or(0);
        sessions.insert(session_id.clone(), session);

        while sessions.len() > self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(id, _)| **id != session_id)
                .min_by_key(|(_, s)| s.sequence)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::debug!(session = %id, "Evicting oldest upload");
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    /// Remember the outcome of a sync for the log download.
    pub async fn record_result(&self, session_id: &str, result: SyncResult) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.last_result = Some(result);
        }
    }
}
