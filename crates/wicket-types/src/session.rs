//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::SubjectId;

/// Session identifier, derived from the owning subject identifier.
///
/// Derivation is deterministic, so a subject maps to a single session slot
/// and a repeat login re-stamps the existing session rather than opening a
/// second one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Derive the session identifier for a subject
    pub fn derive(subject: &SubjectId) -> Self {
        let digest = Sha256::digest(subject.as_str().as_bytes());
        Self(hex::encode(digest))
    }

    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Server-side session record.
///
/// The session identifier is the registry key; the record carries the
/// credential back-reference and the expiry window. "Expired" is never a
/// stored state; it is computed from `expires_at` at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Back-reference to the owning credential (its storage key)
    pub credential_ref: SubjectId,
    /// Time of creation or last refresh
    pub created_at: DateTime<Utc>,
    /// End of the validity window: `created_at + TTL`
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is still active at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Check whether the session is still active
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}
