//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with touch tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::cache::RecencyHandle;
use crate::clock::duration_to_nanos;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Position of the key in the recency index when this entry was written
    pub handle: RecencyHandle,
    /// Last touch, in nanoseconds since the cache clock's origin
    last_touch: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry touched at `now`.
    pub fn new(value: V, handle: RecencyHandle, now: Duration) -> Self {
        Self {
            value,
            handle,
            last_touch: AtomicU64::new(duration_to_nanos(now)),
        }
    }

    // == Last Touch ==
    /// Returns when the entry was last written or reordered.
    pub fn last_touch(&self) -> Duration {
        Duration::from_nanos(self.last_touch.load(Ordering::Acquire))
    }

    // == Touch ==
    /// Records a touch at `now`.
    ///
    /// Only needs shared access so readers can refresh under a read lock.
    pub fn touch(&self, now: Duration) {
        self.last_touch
            .store(duration_to_nanos(now), Ordering::Release);
    }

    /// Whether this entry is still the one linked at `handle`.
    pub fn is_at(&self, handle: RecencyHandle) -> bool {
        self.handle == handle
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RecencyIndex;

    #[test]
    fn test_entry_creation() {
        let mut index = RecencyIndex::new();
        let handle = index.push_front("key");
        let entry = CacheEntry::new("test_value".to_string(), handle, Duration::from_millis(7));

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.last_touch(), Duration::from_millis(7));
        assert!(entry.is_at(handle));
    }

    #[test]
    fn test_entry_touch_updates_timestamp() {
        let mut index = RecencyIndex::new();
        let handle = index.push_front("key");
        let entry = CacheEntry::new(1u32, handle, Duration::ZERO);

        entry.touch(Duration::from_secs(3));
        assert_eq!(entry.last_touch(), Duration::from_secs(3));
    }

    #[test]
    fn test_entry_not_at_other_handle() {
        let mut index = RecencyIndex::new();
        let first = index.push_front("key");
        index.remove(first);
        let second = index.push_front("key");

        let entry = CacheEntry::new(1u32, second, Duration::ZERO);
        assert!(!entry.is_at(first));
        assert!(entry.is_at(second));
    }
}
