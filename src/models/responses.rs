//! Response DTOs for the sidecar API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::state::{PublishOutcome, SyncStats};
use crate::store::Document;
use crate::txqueue::QueuedTransaction;

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /cache`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache` and `POST /cache/invalidate`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

/// Response body for `POST /state/publish`
#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    /// Whether this publish triggered a flush
    pub flushed: bool,
    /// Updates written by that flush
    pub count: usize,
}

impl From<PublishOutcome> for PublishResponse {
    fn from(outcome: PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Buffered => Self {
                flushed: false,
                count: 0,
            },
            PublishOutcome::Flushed(count) => Self {
                flushed: true,
                count,
            },
        }
    }
}

/// Response body for `POST /state/flush`
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub flushed: usize,
}

/// Response body for `POST /batch` and `POST /batch/flush`
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// Operations committed by this call, if it committed
    pub committed: Option<usize>,
    /// Operations still buffered
    pub pending: usize,
}

/// Response body for `POST /query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub documents: Vec<Document>,
}

/// Response body for `POST /tx`
#[derive(Debug, Clone, Serialize)]
pub struct EnqueueResponse {
    pub id: Uuid,
    /// Queue length after the insert
    pub queued: usize,
}

/// Response body for `GET /tx`
#[derive(Debug, Clone, Serialize)]
pub struct QueueResponse {
    pub transactions: Vec<QueuedTransaction>,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub sync: SyncStats,
    pub pending_writes: usize,
    pub queued_transactions: usize,
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
