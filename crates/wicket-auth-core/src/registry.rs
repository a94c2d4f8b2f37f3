//! In-memory session registry
//!
//! Concurrent map of active sessions behind a single reader/writer lock.
//! Every operation is atomic on its own; a caller's read-then-update pair is
//! not, and concurrent refreshes of one session may interleave. Both extend
//! the window, so the final expiry is simply the later of the two.
//!
//! Expired entries are never swept. They stay in the map until overwritten
//! by a new login or removed by an explicit delete.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{Duration, Utc};

use wicket_types::{Session, SessionId, SubjectId};

/// Concurrent session store with TTL stamping
#[derive(Debug)]
pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    /// Create a registry with the given session TTL.
    ///
    /// # Panics
    /// Panics if the TTL overflows `chrono::Duration` (far beyond any
    /// configurable value).
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).expect("session TTL fits in chrono::Duration"),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a session for `id`, overwriting any existing entry.
    ///
    /// Always succeeds; an existing session for the same identifier is
    /// replaced, which restarts its window.
    pub fn create(&self, id: SessionId, credential_ref: SubjectId) -> Session {
        let session = self.stamp(credential_ref);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, session.clone());
        session
    }

    /// Look up a session by identifier.
    ///
    /// Pure lookup: an expired entry is still returned, and the caller is
    /// responsible for checking `expires_at`.
    pub fn read(&self, id: &SessionId) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Re-stamp the session's window, preserving its credential reference.
    ///
    /// Acts as an upsert: an absent `id` gains a fresh entry.
    pub fn update(&self, id: &SessionId, session: Session) -> Session {
        let refreshed = self.stamp(session.credential_ref);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), refreshed.clone());
        refreshed
    }

    /// Remove a session. Removing an absent identifier is not an error.
    pub fn delete(&self, id: &SessionId) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    /// Number of entries, active or stale
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the registry holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stamp(&self, credential_ref: SubjectId) -> Session {
        let now = Utc::now();
        Session {
            credential_ref,
            created_at: now,
            expires_at: now + self.ttl,
        }
    }
}
