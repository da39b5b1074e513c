//! Error types for the sync cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Sync Error Enum ==
/// Unified error type for the cache, sync and relay layers.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Key or document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Compressed value could not be decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Event already has its maximum number of listeners
    #[error("Listener limit reached for event '{0}'")]
    ListenerLimit(String),

    /// Batched write commit was rejected by the document store
    #[error("Batch commit failed: {0}")]
    BatchCommit(String),

    /// Document store failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// JSON-RPC transport or remote error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Filesystem failure (preferences file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SyncError::ListenerLimit(_) => StatusCode::SERVICE_UNAVAILABLE,
            SyncError::BatchCommit(_) | SyncError::Backend(_) | SyncError::Rpc(_) => {
                StatusCode::BAD_GATEWAY
            }
            SyncError::Codec(_)
            | SyncError::Io(_)
            | SyncError::Json(_)
            | SyncError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, SyncError>;
