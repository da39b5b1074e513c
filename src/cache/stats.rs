//! Cache counters and occupancy, as reported by `/stats`.

use serde::Serialize;

/// Running counters plus a point-in-time view of what the cache holds.
///
/// The counters accumulate for the life of the cache. The occupancy fields are
/// only meaningful on a value returned by [`CacheStats::with_occupancy`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Reads that found nothing, including reads of an expired entry
    pub misses: u64,
    /// Entries dropped to get back under the size ceiling
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed, on read or by the sweep
    pub expirations: u64,
    pub total_entries: usize,
    /// Sum of the UTF-16 size estimates of all entries
    pub size_bytes: usize,
    pub compressed_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters and stamps the given occupancy onto the copy.
    pub fn with_occupancy(&self, entries: usize, size_bytes: usize, compressed: usize) -> Self {
        Self {
            total_entries: entries,
            size_bytes,
            compressed_entries: compressed,
            ..self.clone()
        }
    }

    /// hits / (hits + misses); 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}
