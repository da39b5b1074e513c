//! NFT Sync Cache - client-side caching and state synchronization
//!
//! A TTL cache with a size ceiling and optional string compression, batched
//! state sync with event listeners, buffered document writes, cached queries
//! and a prioritized transaction relay queue, exposed over HTTP.

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod prefs;
pub mod query;
pub mod rpc;
pub mod state;
pub mod store;
pub mod tasks;
pub mod txqueue;

pub use api::{create_router, AppState};
pub use cache::{Cache, CacheManager};
pub use config::Config;
pub use error::{Result, SyncError};
pub use state::StateManager;
pub use tasks::{spawn_cleanup_task, spawn_flush_task, spawn_relay_task};
