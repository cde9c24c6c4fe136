use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::classify::Classifier;
use crate::config::DEFAULT_NUM_WORKERS;
use crate::error::{Error, Result};
use crate::pipeline::batcher::Batch;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::pipe::Pipe;
use crate::progress::{NoProgress, Progress};
use crate::record::Review;
use crate::stats::{Counters, Tally};

/// What one worker hands to the reducer when it exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub worker: usize,
    pub tally: Tally,
    /// The worker stopped on cancellation rather than on a drained queue.
    pub cancelled: bool,
}

/// Fans batches out to a fixed set of classification workers.
///
/// The input channel is the bounded work queue; all workers pull from it.
/// Each worker keeps a private [`Tally`], bumps the shared [`Counters`] and
/// emits exactly one [`Partial`] when it stops, whether the queue was
/// drained or the run was cancelled. The stage joins every worker before it
/// releases the output, so the reducer sees the output close only after the
/// last partial.
pub struct WorkerPool<C: ?Sized> {
    num_workers: usize,
    classifier: Arc<C>,
    counters: Arc<Counters>,
    progress: Arc<dyn Progress>,
}

impl<C: ?Sized> WorkerPool<C> {
    pub fn new(classifier: Arc<C>) -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            classifier,
            counters: Arc::new(Counters::new()),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.num_workers = n.max(1);
        self
    }

    pub fn counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = counters;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }
}

#[async_trait]
impl<C> Pipe<Batch<Review>, Partial> for WorkerPool<C>
where
    C: Classifier + ?Sized + 'static,
{
    fn stage_name(&self) -> &'static str {
        "worker_pool"
    }

    async fn process(
        &self,
        input: Receiver<Batch<Review>>,
        output: Sender<Partial>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        let queue = Arc::new(Mutex::new(input));
        let mut workers = JoinSet::new();

        for id in 0..self.num_workers {
            let worker = Worker {
                id,
                queue: queue.clone(),
                classifier: self.classifier.clone(),
                counters: self.counters.clone(),
                progress: self.progress.clone(),
                cancel: cancel.clone(),
            };
            let output = output.clone();
            workers.spawn(async move { worker.run(output).await });
        }

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::ERROR, event = "reviewpipe.worker.failed", stage = "worker_pool", error = %err, "reviewpipe.worker.failed");
                // A lost partial makes the totals wrong; stop the rest of the run.
                cancel.cancel();
                failure.get_or_insert(err);
            }
        }

        // Every worker has exited: releasing the last sender closes the sink.
        drop(output);

        match failure {
            Some(err) => Err(Error::from(err)),
            None => Ok(()),
        }
    }
}

struct Worker<C: ?Sized> {
    id: usize,
    queue: Arc<Mutex<Receiver<Batch<Review>>>>,
    classifier: Arc<C>,
    counters: Arc<Counters>,
    progress: Arc<dyn Progress>,
    cancel: CancelToken,
}

impl<C> Worker<C>
where
    C: Classifier + ?Sized,
{
    async fn run(self, output: Sender<Partial>) {
        let mut tally = Tally::default();
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = "worker", worker = self.id, where_ = "recv", "reviewpipe.cancelled");
                    cancelled = true;
                    break;
                },
                batch = async { self.queue.lock().await.recv().await } => batch,
            };

            // Closed and drained.
            let Some(batch) = next else { break };

            if !self.classify_batch(batch, &mut tally) {
                cancelled = true;
                break;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            event = "reviewpipe.worker.exit",
            worker = self.id,
            negative = tally.negative,
            positive = tally.positive,
            errors = tally.errors,
            cancelled = cancelled,
            "reviewpipe.worker.exit"
        );

        let partial = Partial {
            worker: self.id,
            tally,
            cancelled,
        };
        // Not raced against cancellation: the reducer drains until every
        // worker is gone, so this send always completes.
        if output.send(partial).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::INFO, event = "reviewpipe.downstream.closed", stage = "worker", worker = self.id, "reviewpipe.downstream.closed");
        }
    }

    /// Returns `false` if cancellation interrupted the batch.
    fn classify_batch(&self, batch: Batch<Review>, tally: &mut Tally) -> bool {
        for review in batch.items {
            if self.cancel.is_cancelled() {
                return false;
            }

            let outcome = match self.classifier.classify(&review.text) {
                Ok(sentiment) => Some(sentiment),
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::WARN, event = "reviewpipe.classify.failed", worker = self.id, seq = batch.seq, error = %_err, "reviewpipe.classify.failed");
                    None
                }
            };

            tally.observe(review.rating, outcome);
            self.counters.record(outcome);
            self.progress.inc(1);
        }
        true
    }
}
