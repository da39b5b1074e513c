//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so entries
//! that are never read again do not wait for lazy eviction.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// # Arguments
/// * `cache` - Shared cache manager
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(cache: CacheManager, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_every(cache, sweep_interval(cleanup_interval_secs))
}

/// A zero interval would spin on the cache lock; sweep at most once a second.
fn sweep_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

pub(crate) fn spawn_cleanup_every(cache: CacheManager, interval: Duration) -> JoinHandle<()> {
    let handle = cache.handle();

    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = handle.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
