//! Session middleware
//!
//! Resolves the session cookie before the handler runs and emits the
//! `Set-Cookie` directive after it returns. Every resolution failure
//! (missing cookie, undecodable token, unknown or expired session) degrades
//! to an anonymous request; the client is never rejected here.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use wicket_auth_core::{SESSION_COOKIE_NAME, SESSION_ID_KEY};
use wicket_types::SessionId;

use crate::state::AppState;

/// Session identifier resolved for the current request.
///
/// Inserted into request extensions by the middleware for handlers, and
/// into response extensions by the login handler so a freshly created
/// session reaches the cookie hook.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionId);

/// Resolve the session for the request, run the handler, then apply the
/// cookie hook to the response.
pub async fn session_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let resolved = resolve_session(&state, req.headers());
    if let Some(id) = &resolved {
        req.extensions_mut().insert(CurrentSession(id.clone()));
    }

    let mut response = next.run(req).await;

    // A session opened by the handler (login) supersedes the identity the
    // request arrived with
    let effective = response
        .extensions()
        .get::<CurrentSession>()
        .map(|current| current.0.clone())
        .or(resolved);

    let directive = state.auth.post_request_hook(effective.as_ref());
    match HeaderValue::from_str(&directive.to_header_value()) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            tracing::error!(error = %err, "cookie header value rejected");
        }
    }

    response
}

/// Decode the cookie and look up an active session, sliding its expiry
/// forward on success. Any failure yields `None`.
fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<SessionId> {
    let token = extract_cookie(headers)?;
    let payload = state.auth.decode_cookie(&token).ok()?;
    let id = SessionId::from(payload.get(SESSION_ID_KEY)?.clone());

    let session = state.auth.read_session(&id)?;
    if !session.is_active() {
        // Expired: treat as anonymous and leave the stale entry in place
        return None;
    }

    state.auth.update_session(&id, session);
    tracing::debug!(session = %id, "session refreshed");
    Some(id)
}

/// Extract the session cookie value from the Cookie header
fn extract_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').map(str::trim).find_map(|cookie| {
        cookie
            .strip_prefix(SESSION_COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
            .map(String::from)
    })
}
