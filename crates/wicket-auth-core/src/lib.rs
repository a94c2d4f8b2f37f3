//! Wicket Auth Core - Authentication business logic
//!
//! Core session functionality: the in-memory session registry, the
//! authenticated cookie codec, password verification, and the service
//! orchestrating login, logout, and cookie emission.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod registry;
pub mod service;

pub use codec::{CodecError, CookieCodec, SESSION_COOKIE_NAME};
pub use config::AuthConfig;
pub use crypto::{hash_password, verify_password, PasswordError};
pub use error::AuthError;
pub use registry::SessionRegistry;
pub use service::{AuthService, CookieDirective, SESSION_ID_KEY};
