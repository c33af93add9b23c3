//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's invariants over arbitrary operation
//! sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{
    derive_key, CacheStore, DurableStore, EvictionPolicy, MemoryStorage, DEFAULT_STORAGE_PREFIX,
};
use crate::client::{Method, RequestOptions};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: Duration = Duration::from_secs(300);

fn store_over(storage: &MemoryStorage, max_entries: usize) -> CacheStore {
    CacheStore::new(
        max_entries,
        EvictionPolicy::Fifo,
        Box::new(storage.clone()),
        DEFAULT_STORAGE_PREFIX,
    )
}

// == Strategies ==
/// Generates request-shaped cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "GET:/admin/[a-z]{1,12}(\\?[a-z]{1,6}=[0-9]{1,3})?::".prop_map(|s| s)
}

/// Generates JSON payloads
fn payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,64}".prop_map(|s| json!(s)),
        prop::collection::vec(any::<u32>(), 0..8).prop_map(|v| json!({ "items": v })),
    ]
}

fn method_strategy() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Get),
        Just(Method::Post),
        Just(Method::Put),
        Just(Method::Patch),
        Just(Method::Delete),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Invalidate { pattern: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), payload_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        "/admin/[a-z]{1,3}".prop_map(|pattern| CacheOp::Invalidate { pattern }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Inserting any number of keys never grows memory past capacity, and the
    // durable mirror holds exactly the resident keys.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), payload_strategy()), 1..120)
    ) {
        let max_entries = 20;
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, max_entries);

        for (key, value) in entries {
            store.set(key, value, TEST_TTL);
            prop_assert!(store.len() <= max_entries, "size {} exceeds {}", store.len(), max_entries);
            prop_assert_eq!(storage.len(), store.len());
        }
    }

    // A stored payload comes back unchanged, including after the in-memory
    // map is discarded and rebuilt from the durable mirror.
    #[test]
    fn prop_roundtrip_through_durable_mirror(key in key_strategy(), value in payload_strategy()) {
        let storage = MemoryStorage::new();
        {
            let mut store = store_over(&storage, TEST_MAX_ENTRIES);
            store.set(key.clone(), value.clone(), TEST_TTL);
            prop_assert_eq!(store.get(&key), Some(value.clone()));
        }

        let mut rebuilt = store_over(&storage, TEST_MAX_ENTRIES);
        prop_assert_eq!(rebuilt.load_from_storage(), 1);
        prop_assert_eq!(rebuilt.get(&key), Some(value));
    }

    // After invalidating a pattern no resident key contains it, and every
    // key that did not contain it is still readable.
    #[test]
    fn prop_pattern_invalidation_isolation(
        keys in prop::collection::vec(key_strategy(), 1..30),
        pattern in "/admin/[a-z]{1,2}"
    ) {
        let mut store = CacheStore::in_memory(TEST_MAX_ENTRIES);
        let unique: HashSet<String> = keys.into_iter().collect();
        for key in &unique {
            store.set(key.clone(), json!(key), TEST_TTL);
        }

        let expected = unique.iter().filter(|k| k.contains(&pattern)).count();
        prop_assert_eq!(store.invalidate(Some(pattern.as_str())), expected);

        for key in &unique {
            if key.contains(&pattern) {
                prop_assert!(!store.contains_key(key));
            } else {
                prop_assert_eq!(store.get(key), Some(json!(key)));
            }
        }
    }

    // Hits and misses add up to the number of lookups, and the entry count
    // always matches the store.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::in_memory(TEST_MAX_ENTRIES);
        let mut lookups: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, TEST_TTL),
                CacheOp::Get { key } => {
                    lookups += 1;
                    let _ = store.get(&key);
                }
                CacheOp::Invalidate { pattern } => {
                    store.invalidate(Some(pattern.as_str()));
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits + stats.misses, lookups);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Under FIFO the first-inserted key leaves first, whatever was read.
    #[test]
    fn prop_fifo_eviction_order(
        keys in prop::collection::vec(key_strategy(), 3..10),
        new_key in key_strategy(),
        reads in prop::collection::vec(any::<prop::sample::Index>(), 0..10)
    ) {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        prop_assume!(unique.len() >= 2);
        prop_assume!(!unique.contains(&new_key));

        let mut store = CacheStore::in_memory(unique.len());
        for key in &unique {
            store.set(key.clone(), json!(key), TEST_TTL);
        }
        for index in reads {
            store.get(index.get::<String>(&unique));
        }

        store.set(new_key.clone(), json!("new"), TEST_TTL);

        prop_assert!(!store.contains_key(&unique[0]));
        prop_assert!(store.contains_key(&new_key));
        for key in unique.iter().skip(1) {
            prop_assert!(store.contains_key(key));
        }
    }

    // Identical requests always derive the same key; changing the method
    // or body changes it.
    #[test]
    fn prop_key_derivation_is_deterministic(
        path in "/admin/[a-z]{1,10}(\\?[a-z]=[0-9])?",
        method in method_strategy(),
        body in prop::option::of("[a-z0-9]{0,16}")
    ) {
        let mut options = RequestOptions::new(method);
        options.body = body.clone();

        let key = derive_key(&path, &options);
        prop_assert_eq!(&key, &derive_key(&path, &options.clone()));
        prop_assert!(key.as_str().starts_with(method.as_str()));

        let mut other = options.clone();
        other.body = Some(format!("{}x", body.unwrap_or_default()));
        prop_assert_ne!(key, derive_key(&path, &other));
    }

    // Full invalidation never touches durable keys outside the namespace.
    #[test]
    fn prop_full_invalidation_spares_foreign_keys(
        keys in prop::collection::vec(key_strategy(), 0..20),
        foreign in prop::collection::vec("[a-z_]{1,12}", 1..5)
    ) {
        let storage = MemoryStorage::new();
        let foreign: HashSet<String> = foreign
            .into_iter()
            .filter(|k| !k.starts_with(DEFAULT_STORAGE_PREFIX))
            .collect();
        for key in &foreign {
            storage.set_item(key, "keep").unwrap();
        }

        let mut store = store_over(&storage, TEST_MAX_ENTRIES);
        for key in keys {
            store.set(key, json!(1), TEST_TTL);
        }
        store.invalidate(None);

        let remaining: HashSet<String> = storage.keys().unwrap().into_iter().collect();
        prop_assert_eq!(remaining, foreign);
        prop_assert!(store.is_empty());
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL has elapsed the entry reads as absent and is gone from
    // both tiers.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in payload_strategy()) {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, TEST_MAX_ENTRIES);

        store.set(key.clone(), value.clone(), Duration::from_millis(100));
        prop_assert_eq!(store.get(&key), Some(value));

        std::thread::sleep(Duration::from_millis(150));

        prop_assert_eq!(store.get(&key), None);
        prop_assert!(!store.contains_key(&key));
        prop_assert!(storage.is_empty());
    }
}
