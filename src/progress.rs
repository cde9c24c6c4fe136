//! Progress sinks.
//!
//! Workers report one increment per classified record, from many tasks at
//! once, so implementations must be cheap and thread-safe.

use std::sync::atomic::{AtomicU64, Ordering};

pub trait Progress: Send + Sync {
    fn inc(&self, n: u64);

    /// Total expected increments, once known.
    fn set_length(&self, _len: u64) {}
}

/// Discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    #[inline]
    fn inc(&self, _n: u64) {}
}

/// Sums increments into an atomic counter.
#[derive(Debug, Default)]
pub struct CountingProgress {
    count: AtomicU64,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Progress for CountingProgress {
    #[inline]
    fn inc(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(feature = "cli")]
impl Progress for indicatif::ProgressBar {
    fn inc(&self, n: u64) {
        indicatif::ProgressBar::inc(self, n);
    }

    fn set_length(&self, len: u64) {
        indicatif::ProgressBar::set_length(self, len);
    }
}
