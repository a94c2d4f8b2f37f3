//! Wicket Auth API
//!
//! Session authentication service.
//!
//! ## Endpoints
//!
//! - `POST /login` - Verify a credential and open a session
//! - `GET /logout` - Delete the current session
//! - `GET /health` - Liveness probe
//!
//! Both session endpoints run under the session middleware, which resolves
//! the session cookie before the handler and sets or clears it afterwards.

mod config;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use wicket_auth_core::AuthService;
use wicket_store::FsCredentialStore;

use crate::config::Config;
use crate::handlers::{health, login, logout};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("auth_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wicket Auth API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        credentials_path = %config.credentials_path.display(),
        "Configuration loaded"
    );

    // Create the credential store and auth service
    let store = FsCredentialStore::new(&config.credentials_path);
    let auth = AuthService::new(config.auth.clone(), Arc::new(store))?;

    // Create application state
    let state = AppState::new(auth, config.clone());

    // Build HTTP router
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    // Session routes: the cookie middleware wraps these, so the cookie hook
    // runs after every handled request here
    let session_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_context,
        ));

    // Health route (no timeout - must always respond quickly)
    let health_routes = Router::new().route("/health", get(health));

    // Build middleware stack (order matters - outermost first)
    let stack = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(session_routes)
        .layer(stack)
        .merge(health_routes)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use wicket_auth_core::{hash_password, AuthConfig, SESSION_ID_KEY};
    use wicket_store::CredentialStore;
    use wicket_types::{Credential, SessionId, SubjectId};

    const EMAIL: &str = "u@test.com";
    const PASSWORD: &str = "secret";
    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    async fn state_with_ttl(ttl: Duration) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCredentialStore::new(dir.path());
        let hash = hash_password(PASSWORD).unwrap();
        store.write(&Credential::new(EMAIL, hash)).await.unwrap();

        let config = Config {
            http_port: 0,
            credentials_path: dir.path().to_path_buf(),
            auth: AuthConfig::new(SECRET).with_session_ttl(ttl),
            request_timeout: Duration::from_secs(5),
        };
        let auth = AuthService::new(config.auth.clone(), Arc::new(store)).unwrap();
        (AppState::new(auth, config), dir)
    }

    async fn app() -> (Router, AppState, tempfile::TempDir) {
        let (state, dir) = state_with_ttl(AuthConfig::DEFAULT_SESSION_TTL).await;
        (build_router(state.clone()), state, dir)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn logout_request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/logout");
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("session_cookie={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn set_cookie_header(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Set-Cookie header present")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Token from a Set-Cookie header; empty string means "cleared"
    fn cookie_token(header_value: &str) -> String {
        header_value
            .strip_prefix("session_cookie=")
            .expect("session cookie header")
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn derived_id() -> SessionId {
        SessionId::derive(&SubjectId::derive(EMAIL))
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let (app, _state, _dir) = app().await;

        let body = format!(r#"{{"email": "{EMAIL}", "password": "{PASSWORD}"}}"#);
        let response = app.oneshot(login_request(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie_header(&response);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie_token(&cookie).is_empty());

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"data": true, "errors": null}));
    }

    #[tokio::test]
    async fn test_login_failures_do_not_reveal_which_input_was_wrong() {
        let (app, _state, _dir) = app().await;

        let wrong_password = app
            .clone()
            .oneshot(login_request(
                &format!(r#"{{"email": "{EMAIL}", "password": "nope"}}"#),
            ))
            .await
            .unwrap();
        let unknown_user = app
            .oneshot(login_request(
                r#"{"email": "nobody@test.com", "password": "secret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::NOT_FOUND);
        assert_eq!(unknown_user.status(), StatusCode::NOT_FOUND);

        // Failed logins clear the cookie
        assert!(cookie_token(&set_cookie_header(&wrong_password)).is_empty());

        let a = body_json(wrong_password).await;
        let b = body_json(unknown_user).await;
        assert_eq!(a, b, "responses must be indistinguishable");
        assert_eq!(a["data"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_login_invalid_email_is_bad_request() {
        let (app, _state, _dir) = app().await;

        let response = app
            .oneshot(login_request(
                r#"{"email": "not-an-email", "password": "secret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["data"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_login_malformed_body_is_bad_request() {
        let (app, _state, _dir) = app().await;

        let response = app.oneshot(login_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({"data": false, "errors": "malformed request body"})
        );
    }

    #[tokio::test]
    async fn test_logout_without_session_is_bad_request() {
        let (app, _state, _dir) = app().await;

        let response = app.oneshot(logout_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // The hook still runs and clears the cookie
        assert!(cookie_token(&set_cookie_header(&response)).is_empty());
    }

    #[tokio::test]
    async fn test_login_logout_roundtrip() {
        let (app, state, _dir) = app().await;

        let body = format!(r#"{{"email": "{EMAIL}", "password": "{PASSWORD}"}}"#);
        let login_response = app.clone().oneshot(login_request(&body)).await.unwrap();
        let token = cookie_token(&set_cookie_header(&login_response));

        let logout_response = app
            .clone()
            .oneshot(logout_request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(logout_response.status(), StatusCode::OK);
        assert!(cookie_token(&set_cookie_header(&logout_response)).is_empty());
        assert_eq!(
            body_json(logout_response).await,
            serde_json::json!({"data": true, "errors": null})
        );

        // The session is gone server-side
        assert!(state.auth.read_session(&derived_id()).is_none());

        // Replaying the cookie no longer resolves a session
        let replay = app.oneshot(logout_request(Some(&token))).await.unwrap();
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_treated_as_anonymous() {
        let (app, _state, _dir) = app().await;

        let body = format!(r#"{{"email": "{EMAIL}", "password": "{PASSWORD}"}}"#);
        let login_response = app.clone().oneshot(login_request(&body)).await.unwrap();
        let mut token = cookie_token(&set_cookie_header(&login_response));

        // Corrupt one character of the token
        let flipped = if token.ends_with('A') { 'B' } else { 'A' };
        token.pop();
        token.push(flipped);

        let response = app.oneshot(logout_request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(cookie_token(&set_cookie_header(&response)).is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_refreshed_and_left_in_place() {
        // Zero TTL: the session expires the moment it is created
        let (state, _dir) = state_with_ttl(Duration::ZERO).await;
        let app = build_router(state.clone());

        let body = format!(r#"{{"email": "{EMAIL}", "password": "{PASSWORD}"}}"#);
        let login_response = app.clone().oneshot(login_request(&body)).await.unwrap();
        // Already expired, so the hook clears the cookie even on login
        assert!(cookie_token(&set_cookie_header(&login_response)).is_empty());

        let stale = state
            .auth
            .read_session(&derived_id())
            .expect("stale entry remains in the registry");
        assert!(!stale.is_active());

        // Present the expired session with a freshly minted token: the
        // middleware must treat the request as anonymous
        let payload = std::collections::HashMap::from([(
            SESSION_ID_KEY.to_string(),
            derived_id().to_string(),
        )]);
        let token = state.auth.encode_cookie(&payload).unwrap();
        let response = app.oneshot(logout_request(Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(cookie_token(&set_cookie_header(&response)).is_empty());

        // Not refreshed, not cleaned up: the stale entry is untouched
        let untouched = state.auth.read_session(&derived_id()).unwrap();
        assert_eq!(untouched.expires_at, stale.expires_at);
        assert_eq!(untouched.created_at, stale.created_at);
    }

    #[tokio::test]
    async fn test_error_response_still_refreshes_active_cookie() {
        let (app, state, _dir) = app().await;

        let body = format!(r#"{{"email": "{EMAIL}", "password": "{PASSWORD}"}}"#);
        let login_response = app.clone().oneshot(login_request(&body)).await.unwrap();
        let token = cookie_token(&set_cookie_header(&login_response));
        let before = state.auth.read_session(&derived_id()).unwrap();

        // Malformed body with a valid cookie: 400, but the middleware has
        // refreshed the session and the hook re-sets the cookie
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("session_cookie={token}"))
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!cookie_token(&set_cookie_header(&response)).is_empty());

        let after = state.auth.read_session(&derived_id()).unwrap();
        assert!(after.created_at >= before.created_at);
        assert!(after.expires_at >= before.expires_at);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _state, _dir) = app().await;

        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], serde_json::json!("healthy"));
    }
}
