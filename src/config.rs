//! Configuration Module
//!
//! Cache and soak-driver settings, loadable from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DeletionStrategy;
use crate::error::{CacheError, Result};

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// How evicted keys leave the entry table
    pub strategy: DeletionStrategy,
    /// Minimum age of the last touch before a read reorders the entry
    pub quiet_period: Duration,
    /// Reaper wake-up period (queued strategy only)
    pub reaper_interval: Duration,
    /// Pending-delete queue depth (queued strategy only)
    pub queue_capacity: usize,
}

impl CacheConfig {
    /// Creates a config with the given core parameters and default reaper settings.
    pub fn new(capacity: usize, strategy: DeletionStrategy, quiet_period: Duration) -> Self {
        Self {
            capacity,
            strategy,
            quiet_period,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum live entries (default: 1000)
    /// - `LRU_STRATEGY` - `direct` or `queued` (default: direct)
    /// - `LRU_QUIET_PERIOD_MS` - Quiet period in milliseconds (default: 0)
    /// - `LRU_REAPER_INTERVAL_MS` - Reaper period in milliseconds (default: 1000)
    /// - `LRU_QUEUE_CAPACITY` - Pending-delete queue depth (default: 500)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CacheConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            capacity: parse_var(&lookup, "LRU_CAPACITY").unwrap_or(defaults.capacity),
            strategy: parse_var(&lookup, "LRU_STRATEGY").unwrap_or(defaults.strategy),
            quiet_period: parse_var(&lookup, "LRU_QUIET_PERIOD_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.quiet_period),
            reaper_interval: parse_var(&lookup, "LRU_REAPER_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reaper_interval),
            queue_capacity: parse_var(&lookup, "LRU_QUEUE_CAPACITY")
                .unwrap_or(defaults.queue_capacity),
        }
    }

    /// Rejects settings the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 1 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }

        if self.strategy == DeletionStrategy::Queued {
            if self.queue_capacity < 1 {
                return Err(CacheError::InvalidConfig(
                    "queue_capacity must be at least 1 for the queued strategy".to_string(),
                ));
            }
            if self.reaper_interval.is_zero() {
                return Err(CacheError::InvalidConfig(
                    "reaper_interval must be non-zero for the queued strategy".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            strategy: DeletionStrategy::Direct,
            quiet_period: Duration::ZERO,
            reaper_interval: Duration::from_secs(1),
            queue_capacity: 500,
        }
    }
}

/// Soak driver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Number of worker threads
    pub threads: usize,
    /// Operations issued by each worker
    pub ops_per_thread: u64,
    /// Keys are drawn from `0..key_space`
    pub key_space: u64,
    /// Fraction of operations that are reads
    pub read_ratio: f64,
}

impl DriverConfig {
    /// Loads driver settings from the environment.
    ///
    /// # Environment Variables
    /// - `SOAK_THREADS` (default: 4)
    /// - `SOAK_OPS_PER_THREAD` (default: 100000)
    /// - `SOAK_KEY_SPACE` (default: 4096)
    /// - `SOAK_READ_RATIO` (default: 0.8)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            threads: parse_var(&lookup, "SOAK_THREADS").unwrap_or(defaults.threads),
            ops_per_thread: parse_var(&lookup, "SOAK_OPS_PER_THREAD")
                .unwrap_or(defaults.ops_per_thread),
            key_space: parse_var(&lookup, "SOAK_KEY_SPACE")
                .filter(|space: &u64| *space > 0)
                .unwrap_or(defaults.key_space),
            read_ratio: parse_var(&lookup, "SOAK_READ_RATIO")
                .filter(|ratio: &f64| (0.0..=1.0).contains(ratio))
                .unwrap_or(defaults.read_ratio),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            ops_per_thread: 100_000,
            key_space: 4096,
            read_ratio: 0.8,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.strategy, DeletionStrategy::Direct);
        assert_eq!(config.quiet_period, Duration::ZERO);
        assert_eq!(config.reaper_interval, Duration::from_secs(1));
        assert_eq!(config.queue_capacity, 500);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = CacheConfig::from_lookup(|_| None);
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("LRU_CAPACITY", "64"),
            ("LRU_STRATEGY", "Queued"),
            ("LRU_QUIET_PERIOD_MS", "250"),
            ("LRU_REAPER_INTERVAL_MS", "50"),
            ("LRU_QUEUE_CAPACITY", "8"),
        ]));

        assert_eq!(config.capacity, 64);
        assert_eq!(config.strategy, DeletionStrategy::Queued);
        assert_eq!(config.quiet_period, Duration::from_millis(250));
        assert_eq!(config.reaper_interval, Duration::from_millis(50));
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn test_config_unparsable_values_fall_back() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("LRU_CAPACITY", "lots"),
            ("LRU_STRATEGY", "sometimes"),
        ]));

        assert_eq!(config.capacity, 1000);
        assert_eq!(config.strategy, DeletionStrategy::Direct);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig::new(0, DeletionStrategy::Direct, Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_queued_without_queue() {
        let mut config = CacheConfig::new(10, DeletionStrategy::Queued, Duration::ZERO);
        config.queue_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));

        let mut config = CacheConfig::new(10, DeletionStrategy::Queued, Duration::ZERO);
        config.reaper_interval = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_ignores_queue_settings_for_direct() {
        let mut config = CacheConfig::new(1, DeletionStrategy::Direct, Duration::ZERO);
        config.queue_capacity = 0;
        config.reaper_interval = Duration::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_driver_config_from_lookup() {
        let driver = DriverConfig::from_lookup(lookup_from(&[
            ("SOAK_THREADS", "16"),
            ("SOAK_KEY_SPACE", "0"),
            ("SOAK_READ_RATIO", "1.5"),
        ]));

        assert_eq!(driver.threads, 16);
        assert_eq!(driver.ops_per_thread, 100_000);
        assert_eq!(driver.key_space, 4096);
        assert_eq!(driver.read_ratio, 0.8);
    }
}
