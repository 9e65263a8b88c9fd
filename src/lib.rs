//! Quiet LRU - A thread-safe in-process LRU cache
//!
//! Fixed-capacity memoization cache with strict LRU eviction, an optional
//! quiet period that throttles read reordering, and a choice between inline
//! and background (queued) removal of evicted entries.
//!
//! ```
//! use std::time::Duration;
//! use quiet_lru::{DeletionStrategy, LruCache};
//!
//! let cache = LruCache::new(2, DeletionStrategy::Direct, Duration::ZERO).unwrap();
//! cache.add(1, "apple");
//! cache.add(2, "bee");
//! cache.add(3, "cat");
//!
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&3), Some("cat"));
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, DeletionStrategy, LruCache};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{CacheConfig, DriverConfig};
pub use error::{CacheError, Result};
