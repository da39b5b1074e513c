//! Request DTOs for the sidecar API
//!
//! Defines the structure of incoming HTTP request bodies. Batch writes and
//! queries deserialize straight into [`crate::store::WriteOp`] and
//! [`crate::query::Query`].

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for `PUT /cache`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Request body for `POST /cache/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub prefix: String,
}

/// Request body for `POST /state/publish`
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub key: String,
    pub data: Value,
}

/// Request body for `POST /tx`
#[derive(Debug, Clone, Deserialize)]
pub struct EnqueueRequest {
    pub payload: Value,
    #[serde(default)]
    pub priority: i32,
}
