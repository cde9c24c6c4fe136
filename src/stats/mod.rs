//! Aggregation algebra: live counters, per-worker tallies and the final summary.

mod counters;
mod summary;
mod tally;

pub use counters::{CounterSnapshot, Counters};
pub use summary::Summary;
pub use tally::Tally;
