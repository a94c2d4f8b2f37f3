//! Auth errors

use thiserror::Error;

use wicket_store::StoreError;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed login input
    #[error("validation error: {0}")]
    Validation(&'static str),

    /// Password does not match the stored hash
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credential store failure, including unknown credentials
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    ///
    /// Password mismatch maps to the same status as an unknown credential,
    /// so the response does not reveal which of the two occurred.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidCredentials => 404,
            Self::Store(StoreError::NotFound) => 404,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}
