//! Session handlers (login, logout)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult, BoolResponse};
use crate::middleware::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /login
///
/// Verify the credential and open a session. The fresh session identifier
/// is placed in the response extensions, where the session middleware's
/// cookie hook picks it up and sets the cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload
        .map_err(|_| ApiError::BadRequest("malformed request body".to_string()))?;

    let session_id = state.auth.create_session(&req.email, &req.password).await?;

    let mut response = Json(BoolResponse::ok()).into_response();
    response.extensions_mut().insert(CurrentSession(session_id));
    Ok(response)
}

/// GET /logout
///
/// Delete the session resolved by the middleware. With the session gone,
/// the cookie hook clears the client's cookie on the way out.
pub async fn logout(State(state): State<AppState>, req: Request) -> ApiResult<Json<BoolResponse>> {
    let CurrentSession(session_id) = req
        .extensions()
        .get::<CurrentSession>()
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("no active session".to_string()))?;

    state.auth.delete_session(&session_id);
    Ok(Json(BoolResponse::ok()))
}
