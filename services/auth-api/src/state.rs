//! Application state

use std::sync::Arc;

use wicket_auth_core::AuthService;
use wicket_store::FsCredentialStore;

use crate::config::Config;

/// Type alias for the auth service with the concrete store type
pub type AuthServiceImpl = AuthService<FsCredentialStore>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for login, logout, and cookie maintenance
    pub auth: Arc<AuthServiceImpl>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(auth: AuthServiceImpl, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }

    /// Get the request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
