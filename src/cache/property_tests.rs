//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a reference LRU model.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DeletionStrategy, LruCache};
use crate::clock::ManualClock;
use crate::config::CacheConfig;

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: u8, value: u32 },
    Get { key: u8 },
}

fn cache_op_strategy(key_space: u8) -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0..key_space, any::<u32>()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        (0..key_space).prop_map(|key| CacheOp::Get { key }),
    ]
}

fn direct_cache(capacity: usize) -> LruCache<u8, u32> {
    LruCache::new(capacity, DeletionStrategy::Direct, Duration::ZERO).unwrap()
}

// == Reference Model ==
/// Plain LRU list: front = most recent.
struct ModelLru {
    capacity: usize,
    entries: VecDeque<(u8, u32)>,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn add(&mut self, key: u8, value: u32) {
        if let Some(pos) = self.position(key) {
            self.entries.remove(pos);
        } else if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front((key, value));
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.position(key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(entry);
        Some(entry.1)
    }

    fn order(&self) -> Vec<u8> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // With a zero quiet period and the direct strategy, the cache is an exact LRU.
    #[test]
    fn prop_matches_reference_lru(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(12), 1..200)
    ) {
        let cache = direct_cache(capacity);
        let mut model = ModelLru::new(capacity);

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    cache.add(key, value);
                    model.add(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(key), "get({}) diverged", key);
                }
            }
        }

        prop_assert_eq!(cache.recency_order(), model.order());
        prop_assert_eq!(cache.len(), model.entries.len());
    }

    // Once more than `capacity` distinct keys were added, the table sits at capacity.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..20,
        keys in prop::collection::vec(any::<u8>(), 1..200)
    ) {
        let cache = direct_cache(capacity);
        let mut distinct = HashSet::new();

        for key in keys {
            cache.add(key, u32::from(key));
            distinct.insert(key);

            prop_assert!(cache.len() <= capacity, "size {} exceeds {}", cache.len(), capacity);
            prop_assert_eq!(cache.len(), distinct.len().min(capacity));
        }
    }

    // Overwriting a key never changes the size and the last value wins.
    #[test]
    fn prop_overwrite_semantics(
        prefill in prop::collection::vec(any::<u8>(), 0..10),
        key in any::<u8>(),
        value1 in any::<u32>(),
        value2 in any::<u32>()
    ) {
        let cache = direct_cache(16);
        for k in prefill {
            cache.add(k, 0);
        }

        cache.add(key, value1);
        let size = cache.len();
        cache.add(key, value2);

        prop_assert_eq!(cache.len(), size);
        prop_assert_eq!(cache.get(&key), Some(value2));
    }

    // A lookup for a key never added misses and leaves order and size alone.
    #[test]
    fn prop_miss_does_not_mutate(
        keys in prop::collection::hash_set(0u8..100, 1..20),
        missing in 100u8..=255
    ) {
        let cache = direct_cache(8);
        for key in &keys {
            cache.add(*key, u32::from(*key));
        }

        let order = cache.recency_order();
        let size = cache.len();

        prop_assert_eq!(cache.get(&missing), None);
        prop_assert_eq!(cache.recency_order(), order);
        prop_assert_eq!(cache.len(), size);
    }

    // Inside the quiet period reads never reorder, so eviction follows insertion order.
    #[test]
    fn prop_quiet_period_preserves_insertion_order(
        keys in prop::collection::hash_set(0u8..200, 2..10),
        reads in prop::collection::vec(0usize..10, 0..30),
        newcomer in 200u8..=255
    ) {
        let keys: Vec<u8> = keys.into_iter().collect();
        let clock = Arc::new(ManualClock::new());
        let config = CacheConfig::new(keys.len(), DeletionStrategy::Direct, Duration::from_secs(10));
        let cache: LruCache<u8, u32> = LruCache::with_clock(config, clock).unwrap();

        for key in &keys {
            cache.add(*key, u32::from(*key));
        }
        for read in reads {
            let key = keys[read % keys.len()];
            prop_assert_eq!(cache.get(&key), Some(u32::from(key)));
        }

        cache.add(newcomer, 0);
        prop_assert_eq!(cache.peek(&keys[0]), None, "first inserted key must be evicted");
        prop_assert_eq!(cache.stats().reorders, 0);
    }
}
