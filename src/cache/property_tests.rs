//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's round-trip, expiry and eviction behavior.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::compression::{decompress, encode};
use crate::cache::{estimate_size, Cache};

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 64 * 1024;
const TEST_DEFAULT_TTL: u64 = 300_000;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "(user|guild|quest|nft):[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

/// Generates JSON values the cache might hold
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,128}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        ("[a-z]{1,8}", 0u32..10_000).prop_map(|(name, xp)| json!({"name": name, "xp": xp})),
    ]
}

/// Generates text with long runs, the case RLE is meant for
fn repetitive_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z0-9\u{1}é]", 1usize..20), 0..12).prop_map(|runs| {
        runs.into_iter()
            .map(|(c, n)| c.repeat(n))
            .collect::<String>()
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Reading right after a write returns exactly what was written.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let mut cache = Cache::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL);

        cache.set(key.clone(), value.clone(), None).unwrap();

        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // The same holds when string values pass through RLE.
    #[test]
    fn prop_roundtrip_with_compression(key in valid_key_strategy(), text in repetitive_text_strategy()) {
        let mut cache = Cache::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL).with_compression(true);

        cache.set(key.clone(), Value::String(text.clone()), None).unwrap();

        prop_assert_eq!(cache.get(&key), Some(Value::String(text)));
    }

    #[test]
    fn prop_rle_decode_inverts_encode(text in repetitive_text_strategy()) {
        prop_assert_eq!(decompress(&encode(&text)).unwrap(), text);
    }

    // Hits and misses match what the caller observed, and the byte accounting
    // always equals the sum of live entry sizes.
    #[test]
    fn prop_statistics_and_size_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = Cache::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = cache.set(key, value, None);
                }
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, cache.len());
        prop_assert!(stats.size_bytes <= TEST_MAX_SIZE);
    }

    // The byte ceiling holds after every insert.
    #[test]
    fn prop_size_ceiling_enforced(
        entries in prop::collection::vec((valid_key_strategy(), value_strategy()), 1..200)
    ) {
        let max_size = 1024;
        let mut cache = Cache::new(max_size, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            let _ = cache.set(key, value, None);
            prop_assert!(
                cache.size_bytes() <= max_size,
                "Cache size {} exceeds max {}",
                cache.size_bytes(),
                max_size
            );
        }
    }

    // Once over budget, entries leave in insertion order: every survivor was
    // inserted after every evicted key.
    #[test]
    fn prop_eviction_is_oldest_first(count in 5usize..40, budget_entries in 2usize..5) {
        let keys: Vec<String> = (0..count).map(|i| format!("user:{:04}", i)).collect();
        let value = json!("payload");
        let entry_size = estimate_size(&keys[0], &value);
        let mut cache = Cache::new(entry_size * budget_entries, TEST_DEFAULT_TTL);

        for key in &keys {
            cache.set(key.clone(), value.clone(), None).unwrap();
        }

        prop_assert_eq!(cache.len(), budget_entries);
        for (i, key) in keys.iter().enumerate() {
            let should_survive = i >= count - budget_entries;
            prop_assert_eq!(cache.contains_key(key), should_survive, "key {}", key);
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses the entry reads as absent and is gone from storage.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), value in value_strategy()) {
        let mut cache = Cache::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL);

        cache.set(key.clone(), value.clone(), Some(25)).unwrap();
        prop_assert_eq!(cache.get(&key), Some(value));

        sleep(Duration::from_millis(50));

        prop_assert_eq!(cache.get(&key), None);
        prop_assert!(!cache.contains_key(&key));
    }
}

// == Concurrent access through the shared manager ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        use crate::cache::CacheManager;

        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let manager = CacheManager::new(Cache::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL));
            let mut handles = vec![];

            for op in operations {
                let manager = manager.clone();
                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, value } => {
                            let _ = manager.set(key, value).await;
                        }
                        CacheOp::Get { key } => {
                            let _ = manager.get(&key).await;
                        }
                        CacheOp::Delete { key } => {
                            manager.delete(&key).await;
                        }
                    }
                }));
            }

            for handle in handles {
                prop_assert!(handle.await.is_ok(), "task panicked");
            }

            let stats = manager.stats().await;
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate));
            prop_assert!(stats.size_bytes <= TEST_MAX_SIZE);
            Ok(())
        })?;
    }
}
