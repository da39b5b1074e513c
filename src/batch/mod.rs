//! Batch Processor
//!
//! Accumulates document writes and commits them in one call, either when the
//! buffer reaches its threshold or on explicit flush. A successful commit clears
//! the shared cache; a failed one is not retried and its operations are
//! discarded, so one bad operation cannot block later writes.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::cache::CacheManager;
use crate::error::{Result, SyncError};
use crate::store::{DocumentStore, WriteOp};

/// Buffered writer in front of a [`DocumentStore`].
pub struct BatchProcessor {
    store: Arc<dyn DocumentStore>,
    cache: CacheManager,
    pending: Mutex<Vec<WriteOp>>,
    threshold: usize,
}

impl BatchProcessor {
    /// # Arguments
    /// * `store` - Database the buffered writes are committed to
    /// * `cache` - Cache invalidated after each successful commit
    /// * `threshold` - Buffered operations that trigger an automatic flush
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheManager, threshold: usize) -> Self {
        Self {
            store,
            cache,
            pending: Mutex::new(Vec::new()),
            threshold: threshold.max(1),
        }
    }

    // == Queue ==
    /// Buffers `op`. Returns `Some(count)` when this call reached the threshold
    /// and committed the buffer, `None` when the op is only buffered.
    pub async fn queue(&self, op: WriteOp) -> Result<Option<usize>> {
        let buffered = {
            let mut pending = self.pending.lock().await;
            pending.push(op);
            pending.len()
        };

        if buffered >= self.threshold {
            debug!("Write buffer reached threshold {}, committing", self.threshold);
            self.flush().await.map(Some)
        } else {
            Ok(None)
        }
    }

    // == Flush ==
    /// Commits every buffered operation in one call.
    ///
    /// Returns the number committed. On failure the drained operations are
    /// dropped and `BatchCommit` is returned; anything queued meanwhile stays
    /// buffered for the next flush.
    pub async fn flush(&self) -> Result<usize> {
        let ops = std::mem::take(&mut *self.pending.lock().await);
        if ops.is_empty() {
            return Ok(0);
        }

        match self.store.commit(&ops).await {
            Ok(()) => {
                self.cache.clear().await;
                info!("Committed batch of {} writes", ops.len());
                Ok(ops.len())
            }
            Err(e) => {
                error!(
                    "Batch commit of {} writes failed, discarding batch: {}",
                    ops.len(),
                    e
                );
                Err(SyncError::BatchCommit(format!(
                    "{} writes discarded: {}",
                    ops.len(),
                    e
                )))
            }
        }
    }

    /// Number of buffered operations.
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
