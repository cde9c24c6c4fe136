use std::fmt;

use crate::stats::Tally;

/// Final statistics of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub tally: Tally,
    /// Input lines dropped before classification (malformed records).
    pub skipped: u64,
    /// The run was cancelled before the input was exhausted.
    pub partial: bool,
}

impl Summary {
    pub fn new(tally: Tally, skipped: u64, partial: bool) -> Self {
        Self {
            tally,
            skipped,
            partial,
        }
    }

    pub fn negative(&self) -> u64 {
        self.tally.negative
    }

    pub fn positive(&self) -> u64 {
        self.tally.positive
    }

    pub fn errors(&self) -> u64 {
        self.tally.errors
    }

    pub fn total(&self) -> u64 {
        self.tally.total()
    }

    /// Share of negative records in percent, `None` for an empty run.
    pub fn negative_percentage(&self) -> Option<f64> {
        self.percentage(self.tally.negative)
    }

    /// Share of positive records in percent, `None` for an empty run.
    pub fn positive_percentage(&self) -> Option<f64> {
        self.percentage(self.tally.positive)
    }

    pub fn mean_negative_rating(&self) -> Option<f64> {
        self.tally.mean_negative_rating()
    }

    fn percentage(&self, count: u64) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| count as f64 * 100.0 / total as f64)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total negative reviews: {}", self.negative())?;
        writeln!(f, "Total positive reviews: {}", self.positive())?;
        if let (Some(neg), Some(pos)) = (self.negative_percentage(), self.positive_percentage()) {
            writeln!(f, "Percentage negative reviews: {neg:.2}%")?;
            writeln!(f, "Percentage positive reviews: {pos:.2}%")?;
        }
        match self.mean_negative_rating() {
            Some(mean) => writeln!(f, "Average negative rating: {mean:.2}")?,
            None => writeln!(f, "Average negative rating: none (no negative reviews observed)")?,
        }
        if self.errors() > 0 {
            writeln!(f, "Unclassified reviews: {}", self.errors())?;
        }
        if self.skipped > 0 {
            writeln!(f, "Skipped lines: {}", self.skipped)?;
        }
        if self.partial {
            writeln!(f, "Run was cancelled: statistics cover only the records processed")?;
        }
        Ok(())
    }
}
