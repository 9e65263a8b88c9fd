//! Cache Statistics Module
//!
//! Tracks cache metrics including hits, misses, evictions and reorders.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// Number of reads that moved their key to the front
    pub reorders: u64,
    /// Number of evicted keys removed by the reaper
    pub reaped: u64,
    /// Evictions that bypassed a full pending-delete queue
    pub queue_overflows: u64,
    /// Entries in the table, including keys awaiting the reaper
    pub total_entries: usize,
    /// Entries tracked by the recency index
    pub live_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Keys evicted from the ordering but still present in the table.
    pub fn pending_deletes(&self) -> usize {
        self.total_entries.saturating_sub(self.live_entries)
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by the cache façade and the reaper.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    reorders: AtomicU64,
    reaped: AtomicU64,
    queue_overflows: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reorder(&self) {
        self.reorders.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reaped(&self, count: usize) {
        self.reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_queue_overflow(&self) {
        self.queue_overflows.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Builds a [`CacheStats`] with the given table and index sizes.
    pub fn snapshot(&self, total_entries: usize, live_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            reorders: self.reorders.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
            total_entries,
            live_entries,
        }
    }
}
