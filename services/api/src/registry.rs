//! Per-connection session state and the process-wide session registry.
//!
//! Each live WebSocket connection owns exactly one [`Session`]; the registry
//! is the only state shared across connections and is guarded by a single
//! mutex. Entries are inserted at connect and removed on every exit path at
//! disconnect, so no session outlives its connection.

use showroom_core::transcript::{Message, Transcript};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session '{0}' is already registered")]
    DuplicateSession(String),
    #[error("no session registered for '{0}'")]
    UnknownSession(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Closing,
}

/// Server-side state for one live connection: its identity and transcript.
///
/// The transcript mutex is uncontended in practice; the owning connection
/// task is its only writer.
#[derive(Debug)]
pub struct Session {
    id: String,
    transcript: Mutex<Transcript>,
    state: Mutex<SessionState>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            transcript: Mutex::new(Transcript::new()),
            state: Mutex::new(SessionState::Active),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn append(&self, message: Message) {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .append(message);
    }

    /// Clones out the full ordered history for one agent invocation.
    pub fn snapshot(&self) -> Vec<Message> {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .snapshot()
            .to_vec()
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .len()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("state lock poisoned")
    }

    pub fn mark_closing(&self) {
        *self.state.lock().expect("state lock poisoned") = SessionState::Closing;
    }
}

/// Process-wide map from connection identity to its session.
///
/// Created once at server start and injected through application state,
/// never held as an ambient global.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and stores a fresh session keyed by `connection_id`.
    pub fn open(&self, connection_id: &str) -> Result<Arc<Session>, RegistryError> {
        let mut sessions = self.sessions.lock().expect("registry lock poisoned");
        if sessions.contains_key(connection_id) {
            return Err(RegistryError::DuplicateSession(connection_id.to_string()));
        }
        let session = Arc::new(Session::new(connection_id.to_string()));
        sessions.insert(connection_id.to_string(), session.clone());
        Ok(session)
    }

    /// Removes and discards the session. Idempotent: closing an absent
    /// session is a no-op, not an error.
    pub fn close(&self, connection_id: &str) {
        let removed = self
            .sessions
            .lock()
            .expect("registry lock poisoned")
            .remove(connection_id);
        if let Some(session) = removed {
            session.mark_closing();
        }
    }

    pub fn get(&self, connection_id: &str) -> Result<Arc<Session>, RegistryError> {
        self.sessions
            .lock()
            .expect("registry lock poisoned")
            .get(connection_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownSession(connection_id.to_string()))
    }

    /// Number of currently live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_get_returns_same_session() {
        let registry = SessionRegistry::new();
        let opened = registry.open("conn-1").unwrap();
        let fetched = registry.get("conn-1").unwrap();
        assert!(Arc::ptr_eq(&opened, &fetched));
        assert_eq!(fetched.id(), "conn-1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_open_is_rejected() {
        let registry = SessionRegistry::new();
        registry.open("conn-1").unwrap();
        let err = registry.open("conn-1").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSession(_)));
    }

    #[test]
    fn close_removes_the_session() {
        let registry = SessionRegistry::new();
        let session = registry.open("conn-1").unwrap();
        registry.close("conn-1");
        assert!(registry.is_empty());
        assert_eq!(session.state(), SessionState::Closing);
        let err = registry.get("conn-1").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSession(_)));
    }

    #[test]
    fn close_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.close("never-opened");
        registry.open("conn-1").unwrap();
        registry.close("conn-1");
        registry.close("conn-1");
        assert!(registry.is_empty());
    }

    #[test]
    fn sessions_start_active_with_empty_transcript() {
        let registry = SessionRegistry::new();
        let session = registry.open("conn-1").unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.transcript_len(), 0);
    }

    #[test]
    fn transcript_appends_through_the_session() {
        let registry = SessionRegistry::new();
        let session = registry.open("conn-1").unwrap();
        session.append(Message::user("hello"));
        session.append(Message::assistant("hi"));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].content, "hello");
    }
}
