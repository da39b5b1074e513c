//! Cache Manager
//!
//! Shared handle over the process-wide [`Cache`]. Every service that wants
//! caching receives a clone of the same manager instead of reaching for a global.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheStats, Domain};
use crate::error::Result;

/// Cloneable, thread-safe access to one [`Cache`].
#[derive(Clone, Debug)]
pub struct CacheManager {
    cache: Arc<RwLock<Cache>>,
}

impl CacheManager {
    /// Wraps `cache` for sharing.
    pub fn new(cache: Cache) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Returns the shared lock, used by background tasks.
    pub fn handle(&self) -> Arc<RwLock<Cache>> {
        Arc::clone(&self.cache)
    }

    /// Reads `key`. Takes the write lock since expired entries are removed on read.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.cache.write().await.get(key)
    }

    /// Stores `value` under `key` with the default TTL.
    pub async fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        self.cache.write().await.set(key.into(), value, None)
    }

    /// Stores `value` under `key`, expiring after `ttl_ms` (default TTL if None).
    pub async fn set_with_ttl(
        &self,
        key: impl Into<String>,
        value: Value,
        ttl_ms: Option<u64>,
    ) -> Result<()> {
        self.cache.write().await.set(key.into(), value, ttl_ms)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    /// Empties the cache, returning how many entries were dropped.
    pub async fn clear(&self) -> usize {
        let mut cache = self.cache.write().await;
        let removed = cache.len();
        cache.clear();
        debug!("Cache cleared ({} entries)", removed);
        removed
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.cache.write().await.invalidate_prefix(prefix)
    }

    /// Drops every key belonging to `domain`.
    pub async fn invalidate_domain(&self, domain: Domain) -> usize {
        self.invalidate_prefix(domain.prefix()).await
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Get Or Fetch ==
    /// Cache-aside read.
    ///
    /// Returns the cached value when present. Otherwise awaits `fetch` without
    /// holding the lock, stores a `Some` result under `key`, and returns it.
    /// Fetch errors propagate and leave the cache untouched. A result the cache
    /// refuses (oversized entry, invalid key) is still returned, uncached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl_ms: Option<u64>,
        fetch: F,
    ) -> Result<Option<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Value>>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(Some(hit));
        }

        let fetched = fetch().await?;
        if let Some(value) = &fetched {
            if let Err(e) = self.set_with_ttl(key, value.clone(), ttl_ms).await {
                warn!("Not caching fetched value for '{}': {}", key, e);
            }
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn manager() -> CacheManager {
        CacheManager::new(Cache::new(64 * 1024, 60_000))
    }

    #[tokio::test]
    async fn test_clones_share_one_cache() {
        let a = manager();
        let b = a.clone();

        a.set("user:1", json!({"level": 3})).await.unwrap();
        assert_eq!(b.get("user:1").await, Some(json!({"level": 3})));

        b.clear().await;
        assert_eq!(a.get("user:1").await, None);
    }

    #[tokio::test]
    async fn test_get_or_fetch_fetches_once() {
        let cache = manager();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("guild:7", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(json!({"name": "Dragons"})))
                })
                .await
                .unwrap();
            assert_eq!(value, Some(json!({"name": "Dragons"})));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_does_not_cache_absent() {
        let cache = manager();

        let value = cache
            .get_or_fetch("raid:1", None, || async { Ok(None) })
            .await
            .unwrap();

        assert_eq!(value, None);
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_get_or_fetch_propagates_error() {
        let cache = manager();

        let result = cache
            .get_or_fetch("raid:1", None, || async {
                Err(SyncError::Backend("unavailable".to_string()))
            })
            .await;

        assert!(matches!(result, Err(SyncError::Backend(_))));
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_get_or_fetch_returns_value_too_large_to_cache() {
        let cache = CacheManager::new(Cache::new(1024, 60_000));
        let big = json!("x".repeat(2000));

        let value = cache
            .get_or_fetch("nft:big", None, || async { Ok(Some(big.clone())) })
            .await
            .unwrap();

        assert_eq!(value, Some(big));
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_get_or_fetch_returns_value_for_uncacheable_key() {
        let cache = manager();
        let key = "k".repeat(crate::cache::MAX_KEY_LENGTH + 1);

        let value = cache
            .get_or_fetch(&key, None, || async { Ok(Some(json!(1))) })
            .await
            .unwrap();

        assert_eq!(value, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_invalidate_domain() {
        let cache = manager();
        cache.set(Domain::Quest.key("1"), json!(1)).await.unwrap();
        cache.set(Domain::Quest.key("2"), json!(2)).await.unwrap();
        cache.set(Domain::User.key("1"), json!(3)).await.unwrap();

        assert_eq!(cache.invalidate_domain(Domain::Quest).await, 2);
        assert_eq!(cache.get("user:1").await, Some(json!(3)));
    }
}
