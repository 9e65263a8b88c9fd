//! Background Tasks Module
//!
//! Contains background tasks owned by a cache instance.
//!
//! # Tasks
//! - Reaper: Removes evicted keys queued by the `Queued` deletion strategy

mod reaper;

pub use reaper::{spawn_reaper, ReaperHandle};
