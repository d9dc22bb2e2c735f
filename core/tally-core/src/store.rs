//! Recorded sessions, persisted under one named backend value.
//!
//! The mapping is loaded once at construction and flushed in full on every
//! mutation, before the mutating call returns.
//!
//! # Stored Value
//!
//! ```json
//! {
//!   "https://minesweeper.online/game/123": { "type": "Expert", "counts": [5,3,0,0,0,0,0,0,1] }
//! }
//! ```
//!
//! Absent, empty or malformed content loads as an empty store. A single bad entry
//! makes the whole value malformed. A backend that cannot be read at all fails the
//! load instead: starting empty would overwrite the stored games on the next flush.
//!
//! The store does not refuse overwrites; at-most-once recording is the engine's job.

use std::collections::BTreeMap;

use tracing::warn;

use crate::backend::KeyValueBackend;
use crate::error::{Result, TallyError};
use crate::types::{SessionIdentity, SessionRecord};

pub type SessionMap = BTreeMap<SessionIdentity, SessionRecord>;

pub struct SessionStore {
    sessions: SessionMap,
    backend: Box<dyn KeyValueBackend>,
    key: String,
}

impl SessionStore {
    /// Loads the mapping stored under `key`. Corrupt content starts an empty store;
    /// a backend read error is returned.
    pub fn load(backend: Box<dyn KeyValueBackend>, key: &str) -> Result<Self> {
        let sessions = match backend.get(key)? {
            Some(content) => parse_sessions(key, &content),
            None => SessionMap::new(),
        };

        Ok(SessionStore {
            sessions,
            backend,
            key: key.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self, identity: &SessionIdentity) -> Option<&SessionRecord> {
        self.sessions.get(identity)
    }

    pub fn contains(&self, identity: &SessionIdentity) -> bool {
        self.sessions.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionIdentity, &SessionRecord)> {
        self.sessions.iter()
    }

    pub fn snapshot(&self) -> &SessionMap {
        &self.sessions
    }

    /// Inserts (or overwrites) one record and flushes.
    ///
    /// On a failed flush the in-memory map is restored, so memory never holds a
    /// record the backend does not.
    pub fn insert(&mut self, identity: SessionIdentity, record: SessionRecord) -> Result<()> {
        let previous = self.sessions.insert(identity.clone(), record);
        if let Err(e) = self.flush() {
            match previous {
                Some(previous) => self.sessions.insert(identity, previous),
                None => self.sessions.remove(&identity),
            };
            return Err(e);
        }
        Ok(())
    }

    pub fn replace_all(&mut self, sessions: SessionMap) -> Result<()> {
        let previous = std::mem::replace(&mut self.sessions, sessions);
        if let Err(e) = self.flush() {
            self.sessions = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.replace_all(SessionMap::new())
    }

    /// Removes an unrelated backend value. Used for best-effort cleanup.
    pub(crate) fn remove_backend_value(&mut self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    fn flush(&mut self) -> Result<()> {
        let content = serde_json::to_string(&self.sessions)
            .map_err(|e| TallyError::json("Failed to serialize sessions", e))?;
        self.backend.set(&self.key, &content)
    }
}

fn parse_sessions(key: &str, content: &str) -> SessionMap {
    if content.trim().is_empty() {
        return SessionMap::new();
    }

    match serde_json::from_str::<SessionMap>(content) {
        Ok(sessions) => sessions,
        Err(e) => {
            warn!(key, error = %e, "Stored sessions are malformed, starting empty");
            SessionMap::new()
        }
    }
}
