//! Sessions and the store that keeps them between calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::rules;
use crate::types::ExportState;

/// Opaque session token handed to the tool layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random (UUID v4) token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One active game.
///
/// `id` is the key the game is stored under; `game_session` is the token
/// handed to clients and checked on user moves. A restart keeps both, a
/// restore may adopt a token supplied by the client.
///
/// The snapshot is only ever replaced as a whole, by an accepted move,
/// pass, reset, restart or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    game_session: SessionId,
    snapshot: ExportState,
}

impl Session {
    /// Starts a session on the opening position with a fresh game token.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            game_session: SessionId::new(),
            snapshot: rules::init(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn game_session(&self) -> &SessionId {
        &self.game_session
    }

    pub fn snapshot(&self) -> &ExportState {
        &self.snapshot
    }

    /// Mirrors the snapshot's sequence counter.
    pub fn sequence(&self) -> u64 {
        self.snapshot.sequence
    }

    pub(crate) fn replace(&mut self, snapshot: ExportState) {
        self.snapshot = snapshot;
    }

    pub(crate) fn set_game_session(&mut self, token: SessionId) {
        self.game_session = token;
    }
}

/// Keeps sessions alive across calls, keyed by [`SessionId`].
///
/// Implementations must run `update` as one read-modify-write with respect
/// to other calls on the same id.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Option<Session>;

    /// Inserts or replaces the session stored under its own id.
    fn insert(&self, session: Session);

    /// Runs `f` on the stored session. Returns `None` if the id is unknown.
    fn update<R>(&self, id: &SessionId, f: impl FnOnce(&mut Session) -> R) -> Option<R>;

    /// Drops the session, returning it if it was stored.
    fn remove(&self, id: &SessionId) -> Option<Session>;
}

/// In-process store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, id: &SessionId) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    fn insert(&self, session: Session) {
        debug!(session_id = %session.id(), sequence = session.sequence(), "storing session");
        self.lock().insert(session.id().clone(), session);
    }

    fn update<R>(&self, id: &SessionId, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    fn remove(&self, id: &SessionId) -> Option<Session> {
        debug!(session_id = %id, "removing session");
        self.lock().remove(id)
    }
}
