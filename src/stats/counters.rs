use std::sync::atomic::{AtomicU64, Ordering};

use crate::classify::Sentiment;

/// Process-wide live counters.
///
/// Workers bump these as they classify; readers get an eventually
/// consistent view. All operations use relaxed ordering. The final
/// statistics are reduced from per-worker tallies, not from these.
#[derive(Debug, Default)]
pub struct Counters {
    negative: AtomicU64,
    positive: AtomicU64,
    errors: AtomicU64,
    total: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub negative: u64,
    pub positive: u64,
    pub errors: u64,
    pub total: u64,
    pub skipped: u64,
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            negative: AtomicU64::new(0),
            positive: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Count one classified record. `None` means the classifier failed.
    #[inline]
    pub fn record(&self, outcome: Option<Sentiment>) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let bucket = match outcome {
            Some(Sentiment::Negative) => &self.negative,
            Some(Sentiment::Positive) => &self.positive,
            None => &self.errors,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one input line dropped before classification.
    #[inline]
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            negative: self.negative.load(Ordering::Relaxed),
            positive: self.positive.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
