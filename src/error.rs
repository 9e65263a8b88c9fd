//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced while building a cache.
///
/// `add` and `get` never fail; only construction does.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Rejected configuration (zero capacity, zero queue depth, ...)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The reaper thread or its runtime could not be started
    #[error("Failed to start reaper: {0}")]
    ReaperSpawn(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
