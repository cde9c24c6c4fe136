//! # reviewpipe
//!
//! **Bounded-memory sentiment aggregation over huge NDJSON review dumps.**
//!
//! `reviewpipe` streams a newline-delimited file of product reviews through a
//! fixed pool of classification workers and reduces the results into one
//! summary: how many reviews read negative or positive, their shares, and the
//! mean star rating of the negative ones. The input is never loaded whole.
//!
//! ---
//!
//! ## Core Model
//!
//! ```text
//! LineSource → RecordParser → Batcher ─[work queue]→ WorkerPool ─[partials]→ Reducer → Summary
//! ```
//!
//! Each stage implements [`Pipe`] and talks to its neighbours over bounded
//! Tokio channels:
//!
//! - the **work queue** holds at most `queue_capacity` batches of
//!   `chunk_size` reviews; a full queue stalls the batcher (backpressure);
//! - the **worker pool** runs `num_workers` tasks pulling from the queue;
//!   each keeps a private [`Tally`] and reports it exactly once on exit;
//! - the **reducer** merges tallies. `Tally` is a commutative monoid, so the
//!   result is the same however reviews were batched or distributed.
//!
//! ---
//!
//! ## Example
//!
//! ```no_run
//! use reviewpipe::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> reviewpipe::error::Result<()> {
//!     let cancel = CancelToken::new();
//!     let _timeout = cancel.cancel_after(std::time::Duration::from_secs(600));
//!
//!     let summary = Analyzer::new(LexiconClassifier::new())
//!         .config(PipelineConfig::default())
//!         .run_file("Books.jsonl", cancel)
//!         .await?;
//!
//!     print!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! Any `Fn(&str) -> Sentiment + Send + Sync` is a [`Classifier`]:
//!
//! ```no_run
//! use reviewpipe::prelude::*;
//!
//! let analyzer = Analyzer::new(|text: &str| {
//!     if text.contains("refund") { Sentiment::Negative } else { Sentiment::Positive }
//! });
//! # let _ = analyzer;
//! ```
//!
//! ---
//!
//! ## Cancellation
//!
//! One [`CancelToken`] is observed at every blocking point: source reads,
//! queue pushes, queue pops. Once cancelled, workers stop and still report
//! what they have, and the run returns `Ok` with [`Summary::partial`] set.
//!
//! ---
//!
//! ## Error Handling Contract
//!
//! - Malformed lines are logged, counted in [`Summary::skipped`] and skipped.
//! - Classifier failures are logged and counted as errors, never as negative
//!   or positive.
//! - Source I/O failures, overlong lines and panicked workers fail the run.
//!
//! ---
//!
//! ## Observability
//!
//! With the default `tracing` feature, stages emit structured events such as
//! `reviewpipe.cancelled`, `reviewpipe.downstream.closed`,
//! `reviewpipe.parse.skipped`, `reviewpipe.classify.failed`,
//! `reviewpipe.worker.exit` and `reviewpipe.reduce.done`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! - `tracing` *(default)*: structured events and stage spans.
//! - `fetch`: download-if-missing, gzip decompression and line counting
//!   ([`source::fetch`]).
//! - `cli`: the `reviewpipe` binary.
//!
//! [`Pipe`]: pipeline::pipe::Pipe
//! [`Tally`]: stats::Tally
//! [`Classifier`]: classify::Classifier
//! [`CancelToken`]: pipeline::cancel::CancelToken
//! [`Summary::partial`]: stats::Summary::partial
//! [`Summary::skipped`]: stats::Summary::skipped

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod source;
pub mod stats;

pub mod prelude {
    //! Convenient imports for most `reviewpipe` users.

    pub use crate::analyzer::Analyzer;
    pub use crate::classify::{Classifier, ClassifyError, LexiconClassifier, Sentiment};
    pub use crate::config::PipelineConfig;
    pub use crate::pipeline::cancel::CancelToken;
    pub use crate::pipeline::chain::PipeExt;
    pub use crate::pipeline::runtime::Runtime;
    pub use crate::stats::Summary;
}
