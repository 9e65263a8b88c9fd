//! Cache Store Module
//!
//! Main cache engine combining the entry table with recency tracking,
//! the quiet-period throttle and the configured deletion strategy.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::info;

use crate::cache::deletion::Deleter;
use crate::cache::{
    CacheEntry, CacheStats, DeletionStrategy, EntryTable, Evicted, QuietPeriod, RecencyHandle,
    RecencyIndex, StatsRecorder,
};
use crate::clock::{Clock, MonotonicClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_reaper;

// == LRU Cache ==
/// Fixed-capacity, thread-safe LRU cache.
///
/// Share it between threads behind an `Arc`; every operation takes `&self`.
///
/// # Locking
/// The recency index sits behind a mutex that `add` holds for its whole
/// duration. The entry table sits behind a reader-writer lock: lookups share
/// it, `add` and the reaper take it exclusively. The mutex is always taken
/// before the table lock, and `get` never holds the table lock while waiting
/// for the mutex.
pub struct LruCache<K, V> {
    /// Key-value storage, shared with the reaper
    table: Arc<EntryTable<K, V>>,
    /// Touch order of live keys
    index: Mutex<RecencyIndex<K>>,
    /// Removal path for evicted keys
    deleter: Deleter<K>,
    /// Read reorder throttle
    quiet: QuietPeriod,
    /// Maximum number of live entries
    capacity: usize,
    clock: Arc<dyn Clock>,
    stats: Arc<StatsRecorder>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with default reaper settings.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of live entries, at least 1
    /// * `strategy` - How evicted keys leave the entry table
    /// * `quiet_period` - Minimum touch age before a read reorders; zero reorders every hit
    ///
    /// # Errors
    /// `CacheError::InvalidConfig` if `capacity` is 0.
    pub fn new(capacity: usize, strategy: DeletionStrategy, quiet_period: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(capacity, strategy, quiet_period))
    }

    /// Creates a cache from a full [`CacheConfig`] using the monotonic clock.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let table: Arc<EntryTable<K, V>> = Arc::new(RwLock::new(HashMap::new()));
        let stats = Arc::new(StatsRecorder::new());

        let deleter = match config.strategy {
            DeletionStrategy::Direct => Deleter::Direct,
            DeletionStrategy::Queued => {
                let (queue, pending) = mpsc::channel(config.queue_capacity);
                let reaper = spawn_reaper(
                    Arc::clone(&table),
                    pending,
                    config.reaper_interval,
                    config.queue_capacity,
                    Arc::clone(&stats),
                )?;
                Deleter::Queued { queue, reaper }
            }
        };

        info!(
            "LRU cache created: capacity={}, strategy={}, quiet_period={}ms",
            config.capacity,
            config.strategy,
            config.quiet_period.as_millis()
        );

        Ok(Self {
            table,
            index: Mutex::new(RecencyIndex::new()),
            deleter,
            quiet: QuietPeriod::new(config.quiet_period),
            capacity: config.capacity,
            clock,
            stats,
        })
    }

    // == Add ==
    /// Stores a key-value pair.
    ///
    /// If the key is live, its value is overwritten and it moves to the front.
    /// Otherwise, if the cache already holds `capacity` live keys, the least
    /// recently used one is evicted first. Never evicts more than one entry.
    pub fn add(&self, key: K, value: V) {
        let mut index = self.index.lock();
        let now = self.clock.now();
        let mut table = self.table.write();

        // Overwrite in place when the key is still linked
        if let Some(entry) = table.get_mut(&key) {
            if index.touch(entry.handle) {
                entry.value = value;
                entry.touch(now);
                return;
            }
        }

        // New key, or an evicted key the reaper has not removed yet
        if index.len() >= self.capacity {
            if let Some((victim, handle)) = index.evict_oldest() {
                self.stats.record_eviction();
                self.deleter.delete(
                    &mut *table,
                    Evicted {
                        key: victim,
                        handle,
                    },
                    &self.stats,
                );
            }
        }

        let handle = index.push_front(key.clone());
        table.insert(key, CacheEntry::new(value, handle, now));
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// A hit moves the key to the front unless it was touched within the
    /// quiet period. Under the queued strategy a key that was evicted but not
    /// yet reaped is still returned, without being reordered.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        let (value, handle, due) = {
            let table = self.table.read();
            match table.get(key) {
                Some(entry) => (
                    entry.value.clone(),
                    entry.handle,
                    self.quiet.is_due(entry.last_touch(), now),
                ),
                None => {
                    self.stats.record_miss();
                    return None;
                }
            }
        };

        self.stats.record_hit();
        if due {
            self.reorder(key, handle);
        }
        Some(value)
    }

    // == Peek ==
    /// Retrieves a clone of the value without touching recency or stats.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.table.read().get(key).map(|entry| entry.value.clone())
    }

    /// Moves `key` to the front if it still sits at `handle` and is still due.
    fn reorder(&self, key: &K, handle: RecencyHandle) {
        let mut index = self.index.lock();
        let table = self.table.read();

        let Some(entry) = table.get(key) else {
            return;
        };
        if !entry.is_at(handle) {
            return;
        }

        // Another reader may have refreshed it while we waited for the lock
        let now = self.clock.now();
        if !self.quiet.is_due(entry.last_touch(), now) {
            return;
        }

        if index.touch(handle) {
            entry.touch(now);
            self.stats.record_reorder();
        }
    }

    // == Length ==
    /// Returns the number of entries in the table.
    ///
    /// Under the queued strategy this includes evicted keys awaiting the reaper.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Returns the number of live keys in the recency index.
    pub fn live_len(&self) -> usize {
        self.index.lock().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Returns live keys from most to least recently used.
    pub fn recency_order(&self) -> Vec<K> {
        self.index.lock().iter().cloned().collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let index = self.index.lock();
        let table = self.table.read();
        self.stats.snapshot(table.len(), index.len())
    }
}

impl<K, V> LruCache<K, V> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet.period()
    }

    pub fn strategy(&self) -> DeletionStrategy {
        self.deleter.strategy()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("strategy", &self.strategy())
            .field("quiet_period", &self.quiet.period())
            .finish_non_exhaustive()
    }
}

impl<K, V> Drop for LruCache<K, V> {
    fn drop(&mut self) {
        // Stop the reaper before the table is released
        self.deleter.shutdown();
    }
}
