//! Priority-ordered transaction queue.

use std::cmp::Reverse;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::cache::current_timestamp_ms;

// == Queued Transaction ==
/// A transaction waiting for relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedTransaction {
    pub id: Uuid,
    /// Opaque transaction body handed to the relay
    pub payload: Value,
    /// Higher runs first
    pub priority: i32,
    /// Enqueue time (Unix milliseconds), breaks priority ties
    pub timestamp: u64,
    /// Failed submission attempts so far
    pub retries: u32,
}

impl QueuedTransaction {
    fn sort_key(&self) -> (Reverse<i32>, u64) {
        (Reverse(self.priority), self.timestamp)
    }
}

// == Transaction Queue ==
/// In-memory queue ordered by priority descending, then timestamp ascending.
#[derive(Debug, Default)]
pub struct TransactionQueue {
    items: Vec<QueuedTransaction>,
}

impl TransactionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new transaction and returns its id.
    pub fn enqueue(&mut self, payload: Value, priority: i32) -> Uuid {
        let tx = QueuedTransaction {
            id: Uuid::new_v4(),
            payload,
            priority,
            timestamp: current_timestamp_ms(),
            retries: 0,
        };
        let id = tx.id;
        self.insert(tx);
        id
    }

    /// Puts a transaction back in its ordered position, keeping its original
    /// timestamp and retry count.
    pub fn requeue(&mut self, tx: QueuedTransaction) {
        self.insert(tx);
    }

    /// Removes and returns the head of the queue.
    pub fn pop(&mut self) -> Option<QueuedTransaction> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn peek(&self) -> Option<&QueuedTransaction> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy of the queue in processing order.
    pub fn snapshot(&self) -> Vec<QueuedTransaction> {
        self.items.clone()
    }

    fn insert(&mut self, tx: QueuedTransaction) {
        // Insert after any equal key so ties stay FIFO
        let key = tx.sort_key();
        let index = self.items.partition_point(|queued| queued.sort_key() <= key);
        self.items.insert(index, tx);
    }
}
