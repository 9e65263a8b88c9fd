//! Quiet LRU soak driver
//!
//! Hammers one shared cache from several threads using settings read from
//! the environment, then prints the final statistics as JSON.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiet_lru::{CacheConfig, CacheStats, DeletionStrategy, DriverConfig, LruCache};

/// Summary printed once every worker has finished.
#[derive(Debug, Serialize)]
struct SoakReport {
    cache: CacheConfig,
    driver: DriverConfig,
    elapsed_ms: u128,
    ops_per_sec: f64,
    stats: CacheStats,
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiet_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Quiet LRU soak driver");

    let cache_config = CacheConfig::from_env();
    let driver = DriverConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, strategy={}, quiet_period={}ms, threads={}, ops_per_thread={}, key_space={}",
        cache_config.capacity,
        cache_config.strategy,
        cache_config.quiet_period.as_millis(),
        driver.threads,
        driver.ops_per_thread,
        driver.key_space
    );

    let cache: Arc<LruCache<u64, u64>> = Arc::new(
        LruCache::with_config(cache_config.clone()).context("failed to build cache")?,
    );

    let started = Instant::now();
    thread::scope(|scope| {
        for worker in 0..driver.threads {
            let cache = Arc::clone(&cache);
            let driver = &driver;
            scope.spawn(move || run_worker(&cache, driver, worker as u64));
        }
    });
    let elapsed = started.elapsed();

    let stats = cache.stats();
    let total_ops = driver.ops_per_thread.saturating_mul(driver.threads as u64);
    let ops_per_sec = total_ops as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    if cache_config.strategy == DeletionStrategy::Direct && stats.total_entries > cache_config.capacity
    {
        bail!(
            "entry table holds {} entries, above capacity {}",
            stats.total_entries,
            cache_config.capacity
        );
    }

    let report = SoakReport {
        cache: cache_config,
        driver,
        elapsed_ms: elapsed.as_millis(),
        ops_per_sec,
        stats,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    // Joins the reaper, if any
    drop(cache);
    info!("Soak driver finished in {} ms", report.elapsed_ms);
    Ok(())
}

fn run_worker(cache: &LruCache<u64, u64>, driver: &DriverConfig, worker: u64) {
    let mut rng = fastrand::Rng::with_seed(worker);
    let mut hits = 0u64;

    for _ in 0..driver.ops_per_thread {
        let key = rng.u64(0..driver.key_space);
        if rng.f64() < driver.read_ratio {
            if cache.get(&key).is_some() {
                hits += 1;
            }
        } else {
            cache.add(key, key.wrapping_mul(31));
        }
    }

    debug!("Worker {} done with {} hits", worker, hits);
}
