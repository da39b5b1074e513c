//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order size eviction
//! and lazy TTL expiration.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::compression::{compress, decompress};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, InsertionOrder, MAX_KEY_LENGTH};
use crate::config::Config;
use crate::error::{Result, SyncError};

// == Cache ==
/// In-memory key/value cache with a soft byte ceiling and per-entry TTL.
#[derive(Debug)]
pub struct Cache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Eviction order, oldest insertion first
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of estimated entry sizes
    size_bytes: usize,
    /// Soft ceiling enforced after every insert
    max_size_bytes: usize,
    /// TTL applied when `set` receives none
    default_ttl_ms: u64,
    /// Run-length encode string values
    compression_enabled: bool,
}

impl Cache {
    // == Constructor ==
    /// Creates a new Cache with the given byte ceiling and default TTL.
    ///
    /// # Arguments
    /// * `max_size_bytes` - Soft ceiling on estimated entry sizes
    /// * `default_ttl_ms` - TTL in milliseconds for entries without explicit TTL
    pub fn new(max_size_bytes: usize, default_ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            size_bytes: 0,
            max_size_bytes,
            default_ttl_ms,
            compression_enabled: false,
        }
    }

    /// Creates a Cache from the sidecar configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_size_bytes, config.default_ttl_ms)
            .with_compression(config.compression_enabled)
    }

    /// Enables or disables RLE compression of string values.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression_enabled = enabled;
        self
    }

    // == Set ==
    /// Stores a value with an absolute expiry of now + TTL.
    ///
    /// Overwriting a key resets its timestamp and makes it the newest insertion.
    /// After the insert, the oldest entries are evicted until the total estimated
    /// size is back under the ceiling.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_ms` - Optional TTL in milliseconds (uses default_ttl_ms if None)
    pub fn set(&mut self, key: String, value: Value, ttl_ms: Option<u64>) -> Result<()> {
        if key.is_empty() {
            return Err(SyncError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(SyncError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let (stored, compressed) = match value {
            Value::String(text) if self.compression_enabled => match compress(&text) {
                Some(encoded) => (Value::String(encoded), true),
                None => (Value::String(text), false),
            },
            other => (other, false),
        };

        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        let entry = CacheEntry::new(&key, stored, compressed, ttl);

        if entry.size > self.max_size_bytes {
            return Err(SyncError::InvalidRequest(format!(
                "Entry of {} bytes exceeds cache ceiling of {} bytes",
                entry.size, self.max_size_bytes
            )));
        }

        self.remove_entry(&key);
        self.size_bytes += entry.size;
        self.entries.insert(key.clone(), entry);
        self.order.record_insert(&key);

        self.evict_to_budget();
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` for absent keys. An expired entry is deleted on read and
    /// also yields `None`.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get(key)?;
        if !entry.compressed {
            self.stats.record_hit();
            return Some(entry.value.clone());
        }

        let decoded = match &entry.value {
            Value::String(encoded) => decompress(encoded),
            _ => Err(SyncError::Codec("compressed entry is not text".to_string())),
        };
        match decoded {
            Ok(text) => {
                self.stats.record_hit();
                Some(Value::String(text))
            }
            Err(e) => {
                warn!("Dropping undecodable cache entry '{}': {}", key, e);
                self.remove_entry(key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Empties the cache. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.size_bytes = 0;
    }

    // == Invalidate Prefix ==
    /// Removes every key starting with `prefix`, returning the count removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove_entry(key);
        }
        doomed.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let compressed = self.entries.values().filter(|e| e.compressed).count();
        self.stats
            .with_occupancy(self.entries.len(), self.size_bytes, compressed)
    }

    /// Whether the backing map holds `key`, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the raw entry for `key` without expiry checks or decoding.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(key);
        self.size_bytes = self.size_bytes.saturating_sub(entry.size);
        Some(entry)
    }

    fn evict_to_budget(&mut self) {
        while self.size_bytes > self.max_size_bytes {
            let Some(oldest) = self.order.pop_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.size_bytes = self.size_bytes.saturating_sub(entry.size);
                self.stats.record_eviction();
                debug!("Evicted '{}' ({} bytes) to stay under ceiling", oldest, entry.size);
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::estimate_size;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn store() -> Cache {
        Cache::new(1024 * 1024, 300_000)
    }

    #[test]
    fn test_store_new() {
        let cache = store();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut cache = store();

        cache
            .set("user:1".to_string(), json!({"name": "alice", "xp": 120}), None)
            .unwrap();

        assert_eq!(cache.get("user:1"), Some(json!({"name": "alice", "xp": 120})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut cache = store();
        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut cache = store();

        cache.set("k".to_string(), json!(1), None).unwrap();
        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
    }

    #[test]
    fn test_store_overwrite_adjusts_size() {
        let mut cache = store();

        cache.set("k".to_string(), json!("short"), None).unwrap();
        cache.set("k".to_string(), json!("a much longer value"), None).unwrap();

        assert_eq!(cache.get("k"), Some(json!("a much longer value")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size_bytes(), estimate_size("k", &json!("a much longer value")));
    }

    #[test]
    fn test_store_ttl_expiration_removes_key() {
        let mut cache = store();

        cache.set("quest:9".to_string(), json!("daily"), Some(20)).unwrap();
        assert!(cache.get("quest:9").is_some());

        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("quest:9"), None);
        assert!(!cache.contains_key("quest:9"));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_store_default_ttl_applied() {
        let mut cache = Cache::new(1024, 1234);
        cache.set("k".to_string(), json!(true), None).unwrap();
        assert_eq!(cache.peek("k").unwrap().expiry, 1234);
    }

    #[test]
    fn test_store_evicts_oldest_inserted_first() {
        let entry_size = estimate_size("key1", &json!("value1"));
        let mut cache = Cache::new(entry_size * 3, 300_000);

        cache.set("key1".to_string(), json!("value1"), None).unwrap();
        cache.set("key2".to_string(), json!("value2"), None).unwrap();
        cache.set("key3".to_string(), json!("value3"), None).unwrap();

        // Reads do not protect an entry from eviction
        cache.get("key1");

        cache.set("key4".to_string(), json!("value4"), None).unwrap();

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key("key1"));
        assert!(cache.contains_key("key2"));
        assert!(cache.contains_key("key4"));
        assert_eq!(cache.stats().evictions, 1);
        assert!(cache.size_bytes() <= cache.max_size_bytes());
    }

    #[test]
    fn test_store_large_insert_evicts_several() {
        let small = estimate_size("a", &json!("x"));
        let mut cache = Cache::new(small * 4, 300_000);

        for key in ["a", "b", "c", "d"] {
            cache.set(key.to_string(), json!("x"), None).unwrap();
        }
        // Needs the room of three small entries
        cache.set("e".to_string(), json!("xxxxx"), None).unwrap();

        assert!(!cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(!cache.contains_key("c"));
        assert!(cache.contains_key("d"));
        assert!(cache.contains_key("e"));
    }

    #[test]
    fn test_store_rejects_entry_larger_than_ceiling() {
        let mut cache = Cache::new(16, 300_000);
        let result = cache.set("k".to_string(), json!("far too long for this cache"), None);
        assert!(matches!(result, Err(SyncError::InvalidRequest(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_clear() {
        let mut cache = store();
        cache.set("a".to_string(), json!(1), None).unwrap();
        cache.set("b".to_string(), json!(2), None).unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_store_invalidate_prefix() {
        let mut cache = store();
        cache.set("guild:1".to_string(), json!(1), None).unwrap();
        cache.set("guild:2".to_string(), json!(2), None).unwrap();
        cache.set("user:1".to_string(), json!(3), None).unwrap();

        assert_eq!(cache.invalidate_prefix("guild:"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("user:1"));
    }

    #[test]
    fn test_store_compression_round_trip() {
        let mut cache = store().with_compression(true);
        let text = "=".repeat(200) + "loot" + &"-".repeat(100);

        cache.set("nft:art".to_string(), json!(text.clone()), None).unwrap();

        let raw = cache.peek("nft:art").unwrap();
        assert!(raw.compressed);
        assert!(raw.size < estimate_size("nft:art", &json!(text.clone())));
        assert_eq!(cache.get("nft:art"), Some(json!(text)));
        assert_eq!(cache.stats().compressed_entries, 1);
    }

    #[test]
    fn test_store_compression_leaves_plain_text_alone() {
        let mut cache = store().with_compression(true);
        cache.set("k".to_string(), json!("abcdef"), None).unwrap();
        assert!(!cache.peek("k").unwrap().compressed);
        assert_eq!(cache.get("k"), Some(json!("abcdef")));
    }

    #[test]
    fn test_store_stats() {
        let mut cache = store();

        cache.set("key1".to_string(), json!("value1"), None).unwrap();
        cache.get("key1");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.size_bytes, estimate_size("key1", &json!("value1")));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut cache = store();

        cache.set("key1".to_string(), json!("value1"), Some(20)).unwrap();
        cache.set("key2".to_string(), json!("value2"), Some(10_000)).unwrap();

        sleep(Duration::from_millis(40));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("key2").is_some());
    }

    #[test]
    fn test_store_key_validation() {
        let mut cache = store();
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        assert!(matches!(
            cache.set(long_key, json!(1), None),
            Err(SyncError::InvalidRequest(_))
        ));
        assert!(matches!(
            cache.set(String::new(), json!(1), None),
            Err(SyncError::InvalidRequest(_))
        ));
    }
}
