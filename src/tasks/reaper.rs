//! Reaper Task
//!
//! Background task that periodically removes evicted keys from the entry table.

use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{remove_if_current, EntryTable, Evicted, StatsRecorder};
use crate::error::Result;

// == Reaper Handle ==
/// Owned handle to a running reaper.
///
/// Dropping the handle stops the reaper and joins its thread.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for its final pass.
    ///
    /// Calling this more than once is harmless.
    pub fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The reaper may already be gone; nothing to signal then.
            let _ = shutdown.send(());
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Reaper thread panicked");
            }
        }
    }

    /// Returns true once the reaper thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the reaper on a dedicated thread.
///
/// Every `interval` the reaper drains up to `batch_limit` queued keys and
/// removes each one whose entry still carries the evicted handle. It runs on
/// its own current-thread tokio runtime, so callers need no runtime of their own.
///
/// # Arguments
/// * `table` - Entry table shared with the cache
/// * `pending` - Receiving side of the pending-delete queue
/// * `interval` - Time between passes, must be non-zero
/// * `batch_limit` - Maximum keys removed per pass
/// * `stats` - Counters shared with the cache
///
/// # Returns
/// A [`ReaperHandle`] that stops and joins the reaper when shut down or dropped.
pub fn spawn_reaper<K, V>(
    table: Arc<EntryTable<K, V>>,
    pending: mpsc::Receiver<Evicted<K>>,
    interval: Duration,
    batch_limit: usize,
    stats: Arc<StatsRecorder>,
) -> Result<ReaperHandle>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let thread = thread::Builder::new()
        .name("lru-reaper".to_string())
        .spawn(move || {
            runtime.block_on(run_reaper(
                table,
                pending,
                interval,
                batch_limit,
                stats,
                shutdown_rx,
            ));
        })?;

    Ok(ReaperHandle {
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}

async fn run_reaper<K, V>(
    table: Arc<EntryTable<K, V>>,
    mut pending: mpsc::Receiver<Evicted<K>>,
    interval: Duration,
    batch_limit: usize,
    stats: Arc<StatsRecorder>,
    mut shutdown: oneshot::Receiver<()>,
) where
    K: Eq + Hash,
{
    info!(
        "Starting reaper with interval of {} ms",
        interval.as_millis()
    );

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Fires on an explicit signal or when the cache drops the sender.
            _ = &mut shutdown => {
                let removed = reap_pending(&table, &mut pending, batch_limit, &stats);
                debug!("Reaper final pass: removed {} evicted entries", removed);
                break;
            }
            _ = ticker.tick() => {
                let removed = reap_pending(&table, &mut pending, batch_limit, &stats);
                if removed > 0 {
                    debug!("Reaper pass: removed {} evicted entries", removed);
                }
            }
        }
    }

    info!("Reaper stopped");
}

/// Drains up to `batch_limit` queued keys and removes the ones still current.
///
/// Keys leave the queue only while the table lock is held, so the table
/// never holds more than `capacity + queue depth` entries.
fn reap_pending<K, V>(
    table: &EntryTable<K, V>,
    pending: &mut mpsc::Receiver<Evicted<K>>,
    batch_limit: usize,
    stats: &StatsRecorder,
) -> usize
where
    K: Eq + Hash,
{
    let mut table = table.write();
    let mut removed = 0;

    for _ in 0..batch_limit {
        match pending.try_recv() {
            Ok(evicted) => {
                if remove_if_current(&mut *table, &evicted) {
                    removed += 1;
                }
            }
            Err(_) => break,
        }
    }
    drop(table);

    if removed > 0 {
        stats.record_reaped(removed);
    }
    removed
}
