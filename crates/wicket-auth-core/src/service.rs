//! Auth service - ties together the credential store, session registry, and
//! cookie codec
//!
//! Owns the login and logout orchestration plus the post-request hook that
//! decides, after every handled request, whether the client keeps an active
//! session cookie or has it cleared.

use std::collections::HashMap;
use std::sync::Arc;

use wicket_store::CredentialStore;
use wicket_types::{Session, SessionId};

use crate::codec::{CodecError, CookieCodec, SESSION_COOKIE_NAME};
use crate::config::AuthConfig;
use crate::crypto::{self, PasswordError};
use crate::registry::SessionRegistry;
use crate::AuthError;

/// Payload key carrying the session identifier inside the cookie
pub const SESSION_ID_KEY: &str = "session_id";

/// Maximum accepted email length (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;

/// Instruction for the transport layer's `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    /// Keep the client's session: set the cookie to this encoded token
    Set(String),
    /// Drop the client's session: clear the cookie
    Clear,
}

impl CookieDirective {
    /// Render the directive as a `Set-Cookie` header value.
    ///
    /// Clearing emits an empty value with `Max-Age=0` and an `Expires` date
    /// in the past, which removes the cookie from conforming clients.
    pub fn to_header_value(&self) -> String {
        match self {
            Self::Set(token) => {
                format!("{SESSION_COOKIE_NAME}={token}; Path=/; Secure; HttpOnly")
            }
            Self::Clear => format!(
                "{SESSION_COOKIE_NAME}=; Path=/; Secure; HttpOnly; Max-Age=0; \
                 Expires=Thu, 01 Jan 1970 00:00:00 GMT"
            ),
        }
    }
}

/// Authentication service
///
/// Generic over the credential store so tests can substitute an in-memory
/// implementation. The registry and codec are constructed here from the
/// config: the codec's block key is generated fresh per process.
pub struct AuthService<C: CredentialStore> {
    store: Arc<C>,
    registry: SessionRegistry,
    codec: CookieCodec,
}

impl<C: CredentialStore> AuthService<C> {
    /// Create a new auth service.
    ///
    /// # Errors
    /// Returns an error if the configured session secret is too short to
    /// key the cookie codec.
    pub fn new(config: AuthConfig, store: Arc<C>) -> Result<Self, CodecError> {
        let block_key = CookieCodec::generate_block_key();
        Ok(Self {
            store,
            registry: SessionRegistry::new(config.session_ttl),
            codec: CookieCodec::new(&config.session_secret, &block_key)?,
        })
    }

    /// Verify a credential and open a session for it.
    ///
    /// Both inputs are trimmed before use. The returned identifier must be
    /// threaded to the post-request hook by the caller; nothing here stores
    /// it in any request-scoped ambient state.
    pub async fn create_session(&self, email: &str, password: &str) -> Result<SessionId, AuthError> {
        let email = email.trim();
        let password = password.trim();

        validate_email_format(email)?;

        let credential = self.store.read(email).await.map_err(|err| {
            tracing::debug!(error = %err, "credential lookup failed");
            AuthError::from(err)
        })?;

        crypto::verify_password(password, &credential.password_hash).map_err(|err| match err {
            PasswordError::Mismatch => {
                tracing::debug!(subject = %credential.subject_id, "password mismatch");
                AuthError::InvalidCredentials
            }
            other => AuthError::Internal(other.to_string()),
        })?;

        let session_id = SessionId::derive(&credential.subject_id);
        self.registry
            .create(session_id.clone(), credential.subject_id);
        tracing::debug!(session = %session_id, "session created");

        Ok(session_id)
    }

    /// Look up a session. Not-found is a signal, not an error.
    pub fn read_session(&self, id: &SessionId) -> Option<Session> {
        self.registry.read(id)
    }

    /// Reset a session's expiry window
    pub fn update_session(&self, id: &SessionId, session: Session) -> Session {
        self.registry.update(id, session)
    }

    /// Delete a session; absent identifiers are ignored
    pub fn delete_session(&self, id: &SessionId) {
        self.registry.delete(id);
        tracing::debug!(session = %id, "session deleted");
    }

    /// Encode a payload into a cookie token
    pub fn encode_cookie(&self, payload: &HashMap<String, String>) -> Result<String, CodecError> {
        self.codec.encode(payload)
    }

    /// Decode a cookie token into its payload
    pub fn decode_cookie(&self, token: &str) -> Result<HashMap<String, String>, CodecError> {
        self.codec.decode(token)
    }

    /// Decide the cookie directive after a handled request.
    ///
    /// Sets the cookie only when a session identifier was resolved for the
    /// request and still names an active session; every other outcome clears
    /// it, including an encode failure.
    pub fn post_request_hook(&self, session_id: Option<&SessionId>) -> CookieDirective {
        if let Some(id) = session_id {
            if let Some(session) = self.registry.read(id) {
                if session.is_active() {
                    let payload =
                        HashMap::from([(SESSION_ID_KEY.to_string(), id.to_string())]);
                    match self.encode_cookie(&payload) {
                        Ok(token) => return CookieDirective::Set(token),
                        Err(err) => {
                            tracing::error!(error = %err, "cookie encode failed");
                        }
                    }
                }
            }
        }

        CookieDirective::Clear
    }
}

impl<C: CredentialStore> std::fmt::Debug for AuthService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Validate an email address format.
///
/// A format gate, not RFC-complete parsing: one `@`, a non-empty local
/// part, and a dotted domain, with no whitespace or control characters.
fn validate_email_format(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("email is required"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::Validation("email too long"));
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AuthError::Validation("email contains invalid characters"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::Validation("email is missing '@'"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(AuthError::Validation("email has a malformed mailbox"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(AuthError::Validation("email has a malformed domain"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails_accepted() {
        for email in [
            "user@example.com",
            "first.last@example.co.uk",
            "u+tag@sub.example.org",
        ] {
            assert!(validate_email_format(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_invalid_emails_rejected() {
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@nodot",
            "user@.example.com",
            "user@example.com.",
            "user name@example.com",
            "user@exam ple.com",
        ] {
            assert!(validate_email_format(email).is_err(), "{email:?}");
        }
    }

    #[test]
    fn test_overlong_email_rejected() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email_format(&email).is_err());
    }

    #[test]
    fn test_set_directive_header_carries_token() {
        let header = CookieDirective::Set("tok123".to_string()).to_header_value();
        assert_eq!(header, "session_cookie=tok123; Path=/; Secure; HttpOnly");
    }

    #[test]
    fn test_clear_directive_header_expires_cookie() {
        let header = CookieDirective::Clear.to_header_value();
        assert!(header.starts_with("session_cookie=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Expires=Thu, 01 Jan 1970"));
    }
}
