//! Relay step: submit the head transaction, requeue or drop on failure.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::txqueue::{QueuedTransaction, TransactionQueue};

/// Submits transactions to the chain.
#[async_trait]
pub trait TransactionRelay: Send + Sync {
    /// Returns the transaction signature on success.
    async fn submit(&self, tx: &QueuedTransaction) -> Result<String>;
}

/// What one relay step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Queue was empty
    Idle,
    Submitted { id: Uuid, signature: String },
    /// Failed and went back on the queue
    Requeued { id: Uuid, retries: u32 },
    /// Failed for the last allowed time
    Dropped { id: Uuid, retries: u32 },
}

/// Pops the head of `queue` and submits it through `relay`.
///
/// A failed transaction has its retry count bumped and is requeued while the
/// count stays below `max_retries`; otherwise it is dropped. The queue lock is
/// not held while the submission is in flight.
pub async fn process_next(
    queue: &Mutex<TransactionQueue>,
    relay: &dyn TransactionRelay,
    max_retries: u32,
) -> RelayOutcome {
    let Some(mut tx) = queue.lock().await.pop() else {
        return RelayOutcome::Idle;
    };

    match relay.submit(&tx).await {
        Ok(signature) => {
            info!("Relayed transaction {} ({})", tx.id, signature);
            RelayOutcome::Submitted { id: tx.id, signature }
        }
        Err(e) => {
            tx.retries += 1;
            let (id, retries) = (tx.id, tx.retries);
            if retries < max_retries {
                warn!(
                    "Transaction {} failed (attempt {}/{}): {}",
                    id, retries, max_retries, e
                );
                queue.lock().await.requeue(tx);
                RelayOutcome::Requeued { id, retries }
            } else {
                error!(
                    "Dropping transaction {} after {} failed attempts: {}",
                    id, retries, e
                );
                RelayOutcome::Dropped { id, retries }
            }
        }
    }
}
