//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check counters, invalidation scope and expiry agreement
//! across arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::CacheStore;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates keys of the form `domain:resource` from a small alphabet so
/// that sequences revisit the same keys and prefixes.
fn key_strategy() -> impl Strategy<Value = String> {
    ("[a-c]{1,2}", "[0-9]{1,2}").prop_map(|(domain, resource)| format!("{}:{}", domain, resource))
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every get counts exactly one hit or one miss.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, store.len(), "Size mismatch");
    }

    // Prefix invalidation removes exactly the keys starting with the prefix.
    #[test]
    fn prop_prefix_invalidation_scope(
        keys in prop::collection::hash_set(key_strategy(), 1..30),
        domain in "[a-c]{1,2}",
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        for key in &keys {
            store.set(key.clone(), "v".to_string(), None);
        }

        let prefix = format!("{}:", domain);
        let expected_removed: HashSet<&String> =
            keys.iter().filter(|key| key.starts_with(&prefix)).collect();

        let removed = store.invalidate_by_prefix(&prefix).unwrap();
        prop_assert_eq!(removed, expected_removed.len());

        let remaining: HashSet<String> = store.keys().map(str::to_string).collect();
        for key in &keys {
            prop_assert_eq!(remaining.contains(key), !expected_removed.contains(key));
        }
    }

    // Last write wins regardless of the TTLs involved.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy(),
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);

        store.set(key.clone(), value1, Some(Duration::from_secs(1)));
        store.set(key.clone(), value2.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }
}

// Separate block with fewer cases for tests that drive the paused clock.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // After an arbitrary advance, sweep removes exactly the entries that get
    // would treat as expired.
    #[test]
    fn prop_sweep_agrees_with_get(
        ttls in prop::collection::vec(0u64..2_000, 1..20),
        advance_ms in 0u64..2_500,
    ) {
        let runtime = paused_runtime();
        runtime.block_on(async {
            let mut swept = CacheStore::new(TEST_DEFAULT_TTL);
            let mut read = CacheStore::new(TEST_DEFAULT_TTL);

            for (i, ttl) in ttls.iter().enumerate() {
                let key = format!("k:{}", i);
                swept.set(key.clone(), i, Some(Duration::from_millis(*ttl)));
                read.set(key, i, Some(Duration::from_millis(*ttl)));
            }

            tokio::time::advance(Duration::from_millis(advance_ms)).await;

            let removed = swept.sweep();
            let expired_on_read = (0..ttls.len())
                .filter(|i| read.get(&format!("k:{}", i)).is_none())
                .count();

            assert_eq!(removed, expired_on_read);
            assert_eq!(removed, ttls.iter().filter(|ttl| advance_ms > **ttl).count());
        });
    }

    // A positive TTL is honoured up to and including its boundary.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl_ms in 1u64..600_000,
    ) {
        let runtime = paused_runtime();
        runtime.block_on(async {
            let mut store = CacheStore::new(TEST_DEFAULT_TTL);
            store.set(key.clone(), value.clone(), Some(Duration::from_millis(ttl_ms)));

            assert_eq!(store.get(&key), Some(value));

            tokio::time::advance(Duration::from_millis(ttl_ms + 1)).await;
            let misses_before = store.stats().misses;
            assert_eq!(store.get(&key), None);
            assert_eq!(store.stats().misses, misses_before + 1);
        });
    }
}
