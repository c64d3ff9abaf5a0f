// In-memory session registry: the single source of truth for live sessions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::session::Session;

/// Result of appending a participant to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    AlreadyPresent,
    Missing,
}

/// Result of a lookup that applies the staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Fresh(Session),
    /// The entry was older than the TTL and has been removed.
    Expired,
    Missing,
}

/// Maps session id to session state. Every mutation takes the write lock, so
/// readers always see whole sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session. An id that is already taken is left untouched.
    pub fn put(&self, session: Session) -> Result<(), SessionError> {
        let mut map = self.sessions.write();
        match map.entry(session.id().to_string()) {
            Entry::Occupied(entry) => Err(SessionError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(
                    "session {} stored with layout '{}'",
                    session.id(),
                    session.layout()
                );
                entry.insert(session);
                Ok(())
            }
        }
    }

    /// Snapshot of the session, if present.
    pub fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().get(id).cloned();
        if session.is_none() {
            debug!("session not found: {}", id);
        }
        session
    }

    pub fn append_user(&self, id: &str, user_id: &str) -> AppendOutcome {
        let mut map = self.sessions.write();
        match map.get_mut(id) {
            Some(session) => {
                if session.push_user(user_id) {
                    info!("user {} added to session {}", user_id, id);
                    AppendOutcome::Appended
                } else {
                    debug!("user {} already in session {}", user_id, id);
                    AppendOutcome::AlreadyPresent
                }
            }
            None => {
                warn!("tried to add user {} to non-existent session {}", user_id, id);
                AppendOutcome::Missing
            }
        }
    }

    /// Delete the session. Returns whether an entry was removed; removing an
    /// absent id is a no-op.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        if removed {
            info!("session deleted: {}", id);
        } else {
            debug!("session {} already gone", id);
        }
        removed
    }

    /// Look up a session, deleting it instead if it is older than `ttl` at `now`.
    /// The check and the removal happen under one lock acquisition.
    pub fn get_fresh(&self, id: &str, now: DateTime<Utc>, ttl: Duration) -> Lookup {
        let map = self.sessions.upgradable_read();
        let age = match map.get(id) {
            None => return Lookup::Missing,
            Some(session) if !session.is_stale(now, ttl) => return Lookup::Fresh(session.clone()),
            Some(session) => session.age(now),
        };

        let mut map = RwLockUpgradableReadGuard::upgrade(map);
        map.remove(id);
        info!(
            "session {} expired on read (age {}s > ttl {}s)",
            id,
            age.as_secs(),
            ttl.as_secs()
        );
        Lookup::Expired
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }
}
