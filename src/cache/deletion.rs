//! Deletion Strategy Module
//!
//! Decides how an evicted key leaves the entry table: inline, or through
//! the pending-delete queue drained by the reaper.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, RecencyHandle, StatsRecorder};
use crate::tasks::ReaperHandle;

/// Key → entry storage shared between the cache and its reaper.
pub type EntryTable<K, V> = RwLock<HashMap<K, CacheEntry<V>>>;

// == Deletion Strategy ==
/// How evicted keys are removed from the entry table.
///
/// Fixed when the cache is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionStrategy {
    /// Remove inline, inside the `add` that evicted
    #[default]
    Direct,
    /// Hand the key to the background reaper
    Queued,
}

impl fmt::Display for DeletionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionStrategy::Direct => f.write_str("direct"),
            DeletionStrategy::Queued => f.write_str("queued"),
        }
    }
}

impl FromStr for DeletionStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(DeletionStrategy::Direct),
            "queued" => Ok(DeletionStrategy::Queued),
            other => Err(format!("unknown deletion strategy: {other}")),
        }
    }
}

// == Evicted ==
/// A key unlinked from the recency index, together with the handle it had.
///
/// The handle lets a late removal recognise that the key was re-added since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted<K> {
    pub key: K,
    pub handle: RecencyHandle,
}

/// Removes `evicted.key` only if the stored entry is still the evicted one.
///
/// Returns true if an entry was removed.
pub fn remove_if_current<K, V>(table: &mut HashMap<K, CacheEntry<V>>, evicted: &Evicted<K>) -> bool
where
    K: Eq + Hash,
{
    let current = table
        .get(&evicted.key)
        .is_some_and(|entry| entry.is_at(evicted.handle));

    if current {
        table.remove(&evicted.key);
    }
    current
}

// == Deleter ==
/// Runtime side of a [`DeletionStrategy`].
pub(crate) enum Deleter<K> {
    Direct,
    Queued {
        queue: mpsc::Sender<Evicted<K>>,
        reaper: ReaperHandle,
    },
}

impl<K> Deleter<K> {
    pub fn strategy(&self) -> DeletionStrategy {
        match self {
            Deleter::Direct => DeletionStrategy::Direct,
            Deleter::Queued { .. } => DeletionStrategy::Queued,
        }
    }

    // == Shutdown ==
    /// Stops the reaper, if any, and waits for it to finish its pass.
    pub fn shutdown(&mut self) {
        if let Deleter::Queued { reaper, .. } = self {
            reaper.shutdown();
        }
    }
}

impl<K> Deleter<K>
where
    K: Eq + Hash,
{
    // == Delete ==
    /// Disposes of an evicted key. The caller holds the table write lock.
    ///
    /// A full or closed queue falls back to inline removal so `add` never
    /// blocks and no evicted entry is stranded in the table.
    pub fn delete<V>(
        &self,
        table: &mut HashMap<K, CacheEntry<V>>,
        evicted: Evicted<K>,
        stats: &StatsRecorder,
    ) {
        match self {
            Deleter::Direct => {
                remove_if_current(table, &evicted);
            }
            Deleter::Queued { queue, .. } => match queue.try_send(evicted) {
                Ok(()) => {}
                Err(TrySendError::Full(evicted)) => {
                    stats.record_queue_overflow();
                    debug!("Pending-delete queue full, removing evicted key inline");
                    remove_if_current(table, &evicted);
                }
                Err(TrySendError::Closed(evicted)) => {
                    warn!("Reaper is gone, removing evicted key inline");
                    remove_if_current(table, &evicted);
                }
            },
        }
    }
}
