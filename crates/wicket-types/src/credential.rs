//! Credential types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable subject identifier, derived from the account email.
///
/// The hex digest doubles as the credential storage key, so the same email
/// always resolves to the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Derive the subject identifier from an email address.
    ///
    /// The email is trimmed before hashing; no other normalization is
    /// applied. Deterministic: equal inputs yield equal identifiers.
    pub fn derive(email: &str) -> Self {
        let digest = Sha256::digest(email.trim().as_bytes());
        Self(hex::encode(digest))
    }

    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Persisted password credential, one record per subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Subject identifier derived from the email; also the storage key
    pub subject_id: SubjectId,
    /// Account email as registered
    pub email: String,
    /// Argon2id PHC hash of the account password
    pub password_hash: String,
    /// Record creation time
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential record for an email and a pre-hashed password
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            subject_id: SubjectId::derive(&email),
            email,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
