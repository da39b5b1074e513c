//! API Routes
//!
//! Configures the Axum router with all sidecar endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_flush_handler, batch_handler, clear_handler, delete_handler, enqueue_handler,
    events_handler, flush_state_handler, get_handler, health_handler, invalidate_handler,
    list_tx_handler, publish_handler, query_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache`, `DELETE /cache` - Store a value, or clear everything
/// - `GET /cache/:key`, `DELETE /cache/:key` - Read or remove one key
/// - `POST /cache/invalidate` - Drop every key under a prefix
/// - `POST /state/publish`, `POST /state/flush` - Batched state sync
/// - `GET /state/events` - `stateSync` notifications as server-sent events
/// - `POST /batch`, `POST /batch/flush` - Buffered document writes
/// - `POST /query` - Cached document query
/// - `POST /tx`, `GET /tx` - Transaction queue
/// - `GET /stats`, `GET /health`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/state/publish", post(publish_handler))
        .route("/state/flush", post(flush_state_handler))
        .route("/state/events", get(events_handler))
        .route("/batch", post(batch_handler))
        .route("/batch/flush", post(batch_flush_handler))
        .route("/query", post(query_handler))
        .route("/tx", post(enqueue_handler).get(list_tx_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
