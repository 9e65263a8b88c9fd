//! Quiet-Period Throttle
//!
//! Decides whether a read hit should reorder the recency index.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum age of an entry's last touch before a read may move it to the front.
///
/// A zero period reorders on every hit (exact LRU). A non-zero period
/// coalesces hits inside the window into a single reorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietPeriod(Duration);

impl QuietPeriod {
    pub fn new(period: Duration) -> Self {
        Self(period)
    }

    pub fn period(&self) -> Duration {
        self.0
    }

    /// Returns true when a touch recorded at `last_touch` is older than the window.
    pub fn is_due(&self, last_touch: Duration, now: Duration) -> bool {
        if self.0.is_zero() {
            return true;
        }
        now.saturating_sub(last_touch) > self.0
    }
}

impl From<Duration> for QuietPeriod {
    fn from(period: Duration) -> Self {
        Self::new(period)
    }
}
