//! JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::rpc::retry::{with_retry, RetryConfig};
use crate::txqueue::{QueuedTransaction, TransactionRelay};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(SyncError::Rpc(format!("{} (code {})", err.message, err.code)));
        }
        self.result
            .ok_or_else(|| SyncError::Rpc("response has neither result nor error".to_string()))
    }
}

/// Client for one JSON-RPC endpoint.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_retry_config(endpoint, RetryConfig::default())
    }

    pub fn with_retry_config(endpoint: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            retry,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // == Call ==
    /// Invokes `method`, retrying transport failures and RPC errors with backoff.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        with_retry(&self.retry, || self.call_once(method, &params)).await
    }

    async fn call_once(&self, method: &str, params: &Value) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("RPC {} #{} -> {}", method, request.id, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::Rpc(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rpc(format!("HTTP {} from {}", status, self.endpoint)));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Rpc(format!("malformed response: {}", e)))?;
        body.into_result()
    }

    /// Submits a base64-encoded signed transaction, returning its signature.
    pub async fn send_transaction(&self, encoded: &str) -> Result<String> {
        signature_of(self.call("sendTransaction", send_params(encoded)).await?)
    }

    /// Single `sendTransaction` attempt. Used by the relay, whose queue already
    /// counts attempts per transaction.
    async fn send_transaction_once(&self, encoded: &str) -> Result<String> {
        let result = self
            .call_once("sendTransaction", &send_params(encoded))
            .await?;
        signature_of(result)
    }

    /// Read-only asset lookup.
    pub async fn get_asset(&self, asset_id: &str) -> Result<Value> {
        self.call("getAsset", json!({ "id": asset_id })).await
    }
}

fn send_params(encoded: &str) -> Value {
    json!([encoded, {"encoding": "base64"}])
}

fn signature_of(result: Value) -> Result<String> {
    match result {
        Value::String(signature) => Ok(signature),
        other => Err(SyncError::Rpc(format!("unexpected signature: {}", other))),
    }
}

#[async_trait]
impl TransactionRelay for RpcClient {
    async fn submit(&self, tx: &QueuedTransaction) -> Result<String> {
        match &tx.payload {
            Value::String(encoded) => self.send_transaction_once(encoded).await,
            Value::Object(fields) => match fields.get("transaction") {
                Some(Value::String(encoded)) => self.send_transaction_once(encoded).await,
                _ => Err(SyncError::InvalidRequest(
                    "payload object needs a 'transaction' string".to_string(),
                )),
            },
            _ => Err(SyncError::InvalidRequest(
                "transaction payload must be a base64 string".to_string(),
            )),
        }
    }
}
