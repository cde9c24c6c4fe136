use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::classify::Sentiment;

/// Per-worker partial aggregate.
///
/// `Tally` forms a commutative monoid under [`merge`](Tally::merge) with
/// `Tally::default()` as identity, so the reduced result does not depend on
/// how records were batched or which worker saw them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub negative: u64,
    pub positive: u64,
    /// Records the classifier could not label.
    pub errors: u64,
    /// Sum of ratings over records labelled negative.
    pub negative_rating_sum: f64,
}

impl Tally {
    #[inline]
    pub fn observe(&mut self, rating: f64, outcome: Option<Sentiment>) {
        match outcome {
            Some(Sentiment::Negative) => {
                self.negative += 1;
                self.negative_rating_sum += rating;
            }
            Some(Sentiment::Positive) => self.positive += 1,
            None => self.errors += 1,
        }
    }

    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            negative: self.negative + other.negative,
            positive: self.positive + other.positive,
            errors: self.errors + other.errors,
            negative_rating_sum: self.negative_rating_sum + other.negative_rating_sum,
        }
    }

    pub fn total(&self) -> u64 {
        self.negative + self.positive + self.errors
    }

    /// Mean rating of negative records, `None` when there were none.
    pub fn mean_negative_rating(&self) -> Option<f64> {
        (self.negative > 0).then(|| self.negative_rating_sum / self.negative as f64)
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        self.merge(rhs)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = self.merge(rhs);
    }
}

impl Sum for Tally {
    fn sum<It: Iterator<Item = Tally>>(iter: It) -> Tally {
        iter.fold(Tally::default(), Tally::merge)
    }
}
