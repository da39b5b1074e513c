//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, a byte-size ceiling with
//! oldest-first eviction, and optional RLE compression of string values.

pub mod compression;
mod entry;
pub mod keys;
mod manager;
mod order;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, estimate_size, CacheEntry};
pub use keys::Domain;
pub use manager::CacheManager;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::Cache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
