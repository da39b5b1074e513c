//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value (an RLE string when `compressed` is set)
    pub value: Value,
    /// Whether `value` holds run-length encoded text
    pub compressed: bool,
    /// Insertion timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Time to live in milliseconds, relative to `timestamp`
    pub expiry: u64,
    /// Estimated footprint of key and value in bytes
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under, counted in `size`
    /// * `value` - The value to store, already encoded if `compressed`
    /// * `compressed` - Whether `value` is run-length encoded text
    /// * `ttl_ms` - TTL in milliseconds
    pub fn new(key: &str, value: Value, compressed: bool, ttl_ms: u64) -> Self {
        let size = estimate_size(key, &value);
        Self {
            value,
            compressed,
            timestamp: current_timestamp_ms(),
            expiry: ttl_ms,
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry stays valid while `now - timestamp <= expiry`, so it is still
    /// readable at exactly `timestamp + expiry` and expired one millisecond later.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.expiry
    }

    /// Checks if the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let deadline = self.timestamp.saturating_add(self.expiry);
        deadline.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Estimates the memory held by an entry using the UTF-16 length of the key
/// and of the value, two bytes per code unit. Strings count their raw text
/// (no JSON quotes or escapes); other values count their compact JSON text.
pub fn estimate_size(key: &str, value: &Value) -> usize {
    let value_units = match value {
        Value::String(s) => s.encode_utf16().count(),
        other => other.to_string().encode_utf16().count(),
    };
    (key.encode_utf16().count() + value_units) * 2
}
