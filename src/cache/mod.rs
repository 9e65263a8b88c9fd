//! Cache Module
//!
//! Provides a thread-safe LRU cache with quiet-period reordering and
//! pluggable deletion of evicted entries.

mod deletion;
mod entry;
mod lru;
mod stats;
mod store;
mod throttle;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use deletion::{remove_if_current, DeletionStrategy, EntryTable, Evicted};
pub use entry::CacheEntry;
pub use lru::{RecencyHandle, RecencyIndex};
pub use stats::{CacheStats, StatsRecorder};
pub use store::LruCache;
pub use throttle::QuietPeriod;
