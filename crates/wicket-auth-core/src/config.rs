//! Configuration types for the auth core

use std::time::Duration;

/// Auth core configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Long-term secret for cookie key derivation (must be at least 32 bytes)
    pub session_secret: String,
    /// Session time-to-live; a refresh restarts this window
    pub session_ttl: Duration,
}

impl AuthConfig {
    /// Default session TTL
    pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(20 * 60);

    /// Create a new auth config with the default TTL
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            session_ttl: Self::DEFAULT_SESSION_TTL,
        }
    }

    /// Set the session TTL
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
