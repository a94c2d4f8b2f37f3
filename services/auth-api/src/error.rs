//! Error types and the response envelope for the Auth API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use wicket_auth_core::AuthError;
use wicket_store::StoreError;

/// Response envelope shared by every session endpoint
#[derive(Debug, Serialize)]
pub struct BoolResponse {
    pub data: bool,
    pub errors: Option<String>,
}

impl BoolResponse {
    /// Successful outcome: `{"data": true, "errors": null}`
    pub fn ok() -> Self {
        Self {
            data: true,
            errors: None,
        }
    }

    /// Failed outcome carrying a client-safe message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: false,
            errors: Some(message.into()),
        }
    }
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Anything the auth layer cannot map falls back to 404 rather
            // than leaking detail
            Self::Auth(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::NOT_FOUND)
            }
        }
    }

    /// Client-facing message. Unknown-user and wrong-password render
    /// identically, and server-side failures stay generic.
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Auth(AuthError::Validation(msg)) => (*msg).to_string(),
            Self::Auth(AuthError::InvalidCredentials)
            | Self::Auth(AuthError::Store(StoreError::NotFound)) => {
                "invalid email or password".to_string()
            }
            Self::Auth(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "internal API error");
        }

        let body = BoolResponse::err(self.client_message());
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
