//! Store errors

use thiserror::Error;

/// Credential store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the derived key
    #[error("credential not found")]
    NotFound,

    /// Filesystem failure
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record exists but does not parse
    #[error("store decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
