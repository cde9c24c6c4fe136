//! End-to-end driver: source → parser → batcher → worker pool → reducer.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use crate::classify::Classifier;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pipeline::batcher::{Batch, Batcher};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::chain::PipeExt;
use crate::pipeline::pipe::Pipe;
use crate::pipeline::reducer::Reducer;
use crate::pipeline::runtime::Runtime;
use crate::pipeline::worker::{Partial, WorkerPool};
use crate::progress::{NoProgress, Progress};
use crate::record::{RecordParser, Review};
use crate::source::lines::LineSource;
use crate::stats::{Counters, Summary};

/// One sentiment-aggregation run.
///
/// ```no_run
/// use reviewpipe::prelude::*;
///
/// # async fn demo() -> reviewpipe::error::Result<()> {
/// let summary = Analyzer::new(LexiconClassifier::new())
///     .config(PipelineConfig::default().with_num_workers(4))
///     .run_file("reviews.jsonl", CancelToken::new())
///     .await?;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub struct Analyzer<C: ?Sized> {
    classifier: Arc<C>,
    config: PipelineConfig,
    progress: Arc<dyn Progress>,
    counters: Arc<Counters>,
}

impl<C> Analyzer<C>
where
    C: Classifier + 'static,
{
    pub fn new(classifier: C) -> Self {
        Self::from_arc(Arc::new(classifier))
    }
}

impl<C> Analyzer<C>
where
    C: Classifier + ?Sized + 'static,
{
    pub fn from_arc(classifier: Arc<C>) -> Self {
        Self {
            classifier,
            config: PipelineConfig::default(),
            progress: Arc::new(NoProgress),
            counters: Arc::new(Counters::new()),
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Receives one increment per classified record.
    pub fn progress<P: Progress + 'static>(mut self, progress: P) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// Live counters for this run, readable while it is in flight.
    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }

    /// Channel sizing for the chained stages: the work queue behind the
    /// batcher holds `queue_capacity` batches and the partial sink holds one
    /// slot per worker.
    pub fn runtime(&self) -> Runtime {
        Runtime::new()
            .buffer(self.config.stage_buffer)
            .buffer_stage("batcher", self.config.queue_capacity)
            .buffer_stage("worker_pool", self.config.num_workers)
    }

    /// Run over a newline-delimited file. Blank lines are ignored.
    pub async fn run_file(self, path: impl Into<PathBuf>, cancel: CancelToken) -> Result<Summary> {
        let source = LineSource::from_file(path)
            .read_chunk_bytes(self.config.read_chunk_bytes)
            .max_line_bytes(self.config.max_line_bytes)
            .allow_empty_lines(true);
        self.run(source, cancel).await
    }

    /// Run over any source of raw lines.
    ///
    /// Returns `Ok` with a partial summary if `cancel` fires mid-run; returns
    /// `Err` only for failures that make the statistics meaningless (source
    /// I/O, a panicked worker, invalid configuration).
    pub async fn run<S>(self, source: S, cancel: CancelToken) -> Result<Summary>
    where
        S: Pipe<(), Bytes> + Send + Sync + 'static,
    {
        self.config.validate()?;

        let pool = WorkerPool::new(self.classifier.clone())
            .workers(self.config.num_workers)
            .counters(self.counters.clone())
            .progress(self.progress.clone());

        let pipe = source
            .pipe::<Review, _>(RecordParser::new(self.counters.clone()))
            .pipe::<Batch<Review>, _>(Batcher::new(self.config.chunk_size))
            .pipe::<Partial, _>(pool)
            .pipe::<Summary, _>(Reducer::new(self.counters.clone()));

        let (tx, mut rx, handle) = self.runtime().spawn_with_cancel(pipe, cancel);

        // The source may already have stopped on cancellation; that is not an error.
        let _ = tx.send(()).await;
        drop(tx);

        let summary = rx.recv().await;
        handle.await??;
        summary.ok_or_else(|| Error::pipeline("reducer produced no summary"))
    }
}
