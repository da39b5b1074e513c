//! State Flush Task
//!
//! Fixed-interval ticker that flushes buffered state updates that never
//! reached the batch size.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::state::StateManager;

/// Spawns the flush ticker.
///
/// # Arguments
/// * `state` - Shared state manager
/// * `interval_ms` - Milliseconds between flushes
pub fn spawn_flush_task(state: StateManager, interval_ms: u64) -> JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        info!("Starting state flush task every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let flushed = state.flush().await;
            if flushed > 0 {
                debug!("Timer flush wrote {} state updates", flushed);
            }
        }
    })
}
