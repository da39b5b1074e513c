//! Transaction Relay Task
//!
//! Polls the transaction queue and relays one transaction per tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::txqueue::{process_next, TransactionQueue, TransactionRelay};

/// Spawns the relay poller.
///
/// # Arguments
/// * `queue` - Shared transaction queue
/// * `relay` - Chain submitter
/// * `poll_interval_ms` - Milliseconds between relay steps
/// * `max_retries` - Attempts before a transaction is dropped
pub fn spawn_relay_task(
    queue: Arc<Mutex<TransactionQueue>>,
    relay: Arc<dyn TransactionRelay>,
    poll_interval_ms: u64,
    max_retries: u32,
) -> JoinHandle<()> {
    let interval = Duration::from_millis(poll_interval_ms.max(1));

    tokio::spawn(async move {
        info!("Starting transaction relay task every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            process_next(&queue, relay.as_ref(), max_retries).await;
        }
    })
}
