//! API Handlers
//!
//! HTTP request handlers for each sidecar endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio::sync::Mutex;
use tokio_stream::{Stream, StreamExt};

use crate::batch::BatchProcessor;
use crate::cache::{Cache, CacheManager};
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::models::{
    BatchResponse, DeleteResponse, EnqueueRequest, EnqueueResponse, FlushResponse, GetResponse,
    HealthResponse, InvalidateRequest, InvalidateResponse, PublishRequest, PublishResponse,
    QueryResponse, QueueResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::query::Query;
use crate::state::{StateManager, SyncSettings, STATE_SYNC_EVENT};
use crate::store::{DocumentStore, InMemoryStore, WriteOp};
use crate::txqueue::TransactionQueue;

/// Application state shared across all handlers.
///
/// Every field is a cheap handle onto state constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheManager,
    pub state: StateManager,
    pub store: Arc<dyn DocumentStore>,
    pub batch: Arc<BatchProcessor>,
    pub tx_queue: Arc<Mutex<TransactionQueue>>,
}

impl AppState {
    /// Wires the cache layer in front of `store`.
    pub fn with_store(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        let cache = CacheManager::new(Cache::from_config(config));
        let state = StateManager::new(cache.clone(), SyncSettings::from_config(config));
        let batch = Arc::new(BatchProcessor::new(
            Arc::clone(&store),
            cache.clone(),
            config.batch_threshold,
        ));

        Self {
            cache,
            state,
            store,
            batch,
            tx_queue: Arc::new(Mutex::new(TransactionQueue::new())),
        }
    }

    /// Creates an AppState backed by an in-process document store.
    pub fn from_config(config: &Config) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }
}

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(SyncError::InvalidRequest(error_msg));
    }

    state
        .cache
        .set_with_ttl(req.key.clone(), req.value, req.ttl_ms)
        .await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(SyncError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(SyncError::NotFound(key))
    }
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.clear().await;
    Json(InvalidateResponse { removed })
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if req.prefix.is_empty() {
        return Err(SyncError::InvalidRequest(
            "Prefix cannot be empty; use DELETE /cache to clear".to_string(),
        ));
    }
    let removed = state.cache.invalidate_prefix(&req.prefix).await;
    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for POST /state/publish
pub async fn publish_handler(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>> {
    if req.key.is_empty() {
        return Err(SyncError::InvalidRequest("Key cannot be empty".to_string()));
    }
    let outcome = state.state.publish(req.key, req.data).await;
    Ok(Json(outcome.into()))
}

/// Handler for POST /state/flush
pub async fn flush_state_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        flushed: state.state.flush().await,
    })
}

/// Handler for GET /state/events
///
/// Streams `stateSync` notifications as server-sent events. Each connection
/// holds one listener slot, released when the client disconnects.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let events = state
        .state
        .event_stream(STATE_SYNC_EVENT)
        .await
        .ok_or_else(|| SyncError::ListenerLimit(STATE_SYNC_EVENT.to_string()))?;

    let stream = events.map(|event| {
        Event::default()
            .event(event.name.clone())
            .json_data(&event)
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Handler for POST /batch
pub async fn batch_handler(
    State(state): State<AppState>,
    Json(op): Json<WriteOp>,
) -> Result<Json<BatchResponse>> {
    let committed = state.batch.queue(op).await?;
    Ok(Json(BatchResponse {
        committed,
        pending: state.batch.pending().await,
    }))
}

/// Handler for POST /batch/flush
pub async fn batch_flush_handler(State(state): State<AppState>) -> Result<Json<BatchResponse>> {
    let committed = state.batch.flush().await?;
    Ok(Json(BatchResponse {
        committed: Some(committed),
        pending: state.batch.pending().await,
    }))
}

/// Handler for POST /query
pub async fn query_handler(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Json<QueryResponse>> {
    let documents = query.fetch(state.store.as_ref(), &state.cache, None).await?;
    Ok(Json(QueryResponse { documents }))
}

/// Handler for POST /tx
pub async fn enqueue_handler(
    State(state): State<AppState>,
    Json(req): Json<EnqueueRequest>,
) -> Json<EnqueueResponse> {
    let mut queue = state.tx_queue.lock().await;
    let id = queue.enqueue(req.payload, req.priority);
    Json(EnqueueResponse {
        id,
        queued: queue.len(),
    })
}

/// Handler for GET /tx
pub async fn list_tx_handler(State(state): State<AppState>) -> Json<QueueResponse> {
    Json(QueueResponse {
        transactions: state.tx_queue.lock().await.snapshot(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.stats().await;
    let hit_rate = cache.hit_rate();

    Json(StatsResponse {
        cache,
        hit_rate,
        sync: state.state.stats().await,
        pending_writes: state.batch.pending().await,
        queued_transactions: state.tx_queue.lock().await.len(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
