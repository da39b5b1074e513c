//! State Manager
//!
//! Listener registry with a per-event cap plus the pending-update buffer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{current_timestamp_ms, CacheManager};
use crate::config::Config;

/// Event name emitted to every listener after a flush.
pub const STATE_SYNC_EVENT: &str = "stateSync";

/// Callback invoked for published events.
pub type Listener = Arc<dyn Fn(&StateEvent) + Send + Sync>;

// == State Event ==
/// Notification delivered to listeners.
#[derive(Debug, Clone, Serialize)]
pub struct StateEvent {
    /// Event name (`stateSync` for flushes)
    pub name: String,
    /// Keys written by the flush, empty for direct emits
    pub keys: Vec<String>,
    /// Payload of a direct emit
    pub data: Option<Value>,
    /// Unix milliseconds at emission
    pub timestamp: u64,
}

/// Result of a publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Held until the next flush
    Buffered,
    /// Reaching the batch size flushed this many updates
    Flushed(usize),
}

/// Tunables for the state manager.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Pending updates that force an immediate flush
    pub batch_size: usize,
    /// Maximum listeners per event name
    pub max_listeners: usize,
    /// TTL for flushed entries, cache default when None
    pub ttl_ms: Option<u64>,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.sync_batch_size,
            max_listeners: config.max_listeners,
            ttl_ms: None,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_listeners: 10,
            ttl_ms: None,
        }
    }
}

/// Snapshot of the sync bus.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStats {
    pub pending_updates: usize,
    pub listeners: usize,
    pub flushes: u64,
    pub last_sync_ms: Option<u64>,
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<String, Vec<(u64, Listener)>>,
    next_id: u64,
}

impl Registry {
    fn remove(&mut self, event: &str, id: u64) -> bool {
        let Some(slots) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        let removed = slots.len() != before;
        if slots.is_empty() {
            self.listeners.remove(event);
        }
        removed
    }

    fn count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

// == Subscription ==
/// Handle returned by [`StateManager::subscribe`]; consume it to unsubscribe.
pub struct Subscription {
    id: u64,
    event: String,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Removes the listener. Returns false if it was already gone.
    pub async fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.lock().await.remove(&self.event, self.id);
        removed
    }
}

// == State Manager ==
/// Shared pub/sub bus that batches state into the cache.
#[derive(Clone)]
pub struct StateManager {
    cache: CacheManager,
    registry: Arc<Mutex<Registry>>,
    pending: Arc<Mutex<HashMap<String, Value>>>,
    flushes: Arc<AtomicU64>,
    last_sync_ms: Arc<AtomicU64>,
    settings: SyncSettings,
}

impl StateManager {
    pub fn new(cache: CacheManager, settings: SyncSettings) -> Self {
        Self {
            cache,
            registry: Arc::new(Mutex::new(Registry::default())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            flushes: Arc::new(AtomicU64::new(0)),
            last_sync_ms: Arc::new(AtomicU64::new(0)),
            settings,
        }
    }

    // == Subscribe ==
    /// Registers `listener` for `event`.
    ///
    /// Returns `None` and logs a warning when the event already has
    /// `max_listeners` listeners.
    pub async fn subscribe(&self, event: &str, listener: Listener) -> Option<Subscription> {
        let mut registry = self.registry.lock().await;
        let current = registry.listeners.get(event).map_or(0, Vec::len);
        if current >= self.settings.max_listeners {
            warn!(
                "Listener limit ({}) reached for event '{}', subscription rejected",
                self.settings.max_listeners, event
            );
            return None;
        }

        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(event.to_string())
            .or_default()
            .push((id, listener));

        Some(Subscription {
            id,
            event: event.to_string(),
            registry: Arc::downgrade(&self.registry),
        })
    }

    // == Publish ==
    /// Buffers `data` under `key`, flushing at once if the pending set reaches
    /// the batch size. Re-publishing a pending key replaces its value.
    pub async fn publish(&self, key: impl Into<String>, data: Value) -> PublishOutcome {
        let pending = {
            let mut pending = self.pending.lock().await;
            pending.insert(key.into(), data);
            pending.len()
        };

        if pending >= self.settings.batch_size {
            debug!("Pending updates reached batch size {}, flushing", pending);
            PublishOutcome::Flushed(self.flush().await)
        } else {
            PublishOutcome::Buffered
        }
    }

    // == Flush ==
    /// Writes all pending updates into the cache and emits `stateSync` to every
    /// listener. Returns the number of updates written. A flush that writes
    /// nothing, because nothing was pending or every write was refused, emits
    /// nothing and leaves the last sync time alone.
    pub async fn flush(&self) -> usize {
        let drained = std::mem::take(&mut *self.pending.lock().await);
        if drained.is_empty() {
            return 0;
        }

        let mut keys: Vec<String> = Vec::with_capacity(drained.len());
        for (key, value) in drained {
            match self
                .cache
                .set_with_ttl(key.clone(), value, self.settings.ttl_ms)
                .await
            {
                Ok(()) => keys.push(key),
                Err(e) => warn!("State update for '{}' not cached: {}", key, e),
            }
        }
        if keys.is_empty() {
            warn!("Flush wrote no state updates, skipping {}", STATE_SYNC_EVENT);
            return 0;
        }
        keys.sort();

        let now = current_timestamp_ms();
        self.last_sync_ms.store(now, Ordering::SeqCst);
        self.flushes.fetch_add(1, Ordering::SeqCst);

        let event = StateEvent {
            name: STATE_SYNC_EVENT.to_string(),
            keys,
            data: None,
            timestamp: now,
        };
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock().await;
            registry
                .listeners
                .values()
                .flat_map(|slots| slots.iter().map(|(_, l)| Arc::clone(l)))
                .collect()
        };
        for listener in &listeners {
            listener(&event);
        }

        debug!(
            "Flushed {} state updates to {} listeners",
            event.keys.len(),
            listeners.len()
        );
        event.keys.len()
    }

    // == Emit ==
    /// Delivers `data` directly to the listeners of `event`, bypassing the cache.
    /// Returns how many listeners were called.
    pub async fn emit(&self, event: &str, data: Value) -> usize {
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock().await;
            registry
                .listeners
                .get(event)
                .map(|slots| slots.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        let payload = StateEvent {
            name: event.to_string(),
            keys: Vec::new(),
            data: Some(data),
            timestamp: current_timestamp_ms(),
        };
        for listener in &listeners {
            listener(&payload);
        }
        listeners.len()
    }

    /// Time of the last non-empty flush.
    pub fn last_sync_ms(&self) -> Option<u64> {
        match self.last_sync_ms.load(Ordering::SeqCst) {
            0 => None,
            ts => Some(ts),
        }
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn listener_count(&self, event: &str) -> usize {
        self.registry
            .lock()
            .await
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }

    pub async fn stats(&self) -> SyncStats {
        SyncStats {
            pending_updates: self.pending_len().await,
            listeners: self.registry.lock().await.count(),
            flushes: self.flushes.load(Ordering::SeqCst),
            last_sync_ms: self.last_sync_ms(),
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }
}
