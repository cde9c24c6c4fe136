use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::pipe::Pipe;
use crate::pipeline::worker::Partial;
use crate::stats::{Counters, Summary, Tally};

/// Folds worker partials into one [`Summary`].
///
/// The reducer does not stop on cancellation: it drains until the worker
/// pool closes the channel, which happens only after every worker has
/// reported. It then emits a single summary, flagged partial if any worker
/// stopped on cancellation rather than on a drained queue. A token cancelled
/// after the queue was drained does not make a complete run partial.
pub struct Reducer {
    counters: Arc<Counters>,
}

impl Reducer {
    pub fn new(counters: Arc<Counters>) -> Self {
        Self { counters }
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(Arc::new(Counters::new()))
    }
}

#[async_trait]
impl Pipe<Partial, Summary> for Reducer {
    fn stage_name(&self) -> &'static str {
        "reducer"
    }

    async fn process(
        &self,
        mut input: Receiver<Partial>,
        output: Sender<Summary>,
        _buffer: usize,
        _cancel: CancelToken,
    ) -> Result<()> {
        let mut tally = Tally::default();
        let mut cancelled = false;

        while let Some(partial) = input.recv().await {
            #[cfg(feature = "tracing")]
            tracing::event!(
                tracing::Level::DEBUG,
                event = "reviewpipe.reduce.partial",
                stage = "reducer",
                worker = partial.worker,
                negative = partial.tally.negative,
                cancelled = partial.cancelled,
                "reviewpipe.reduce.partial"
            );
            tally += partial.tally;
            cancelled |= partial.cancelled;
        }

        let summary = Summary::new(tally, self.counters.skipped(), cancelled);

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "reviewpipe.reduce.done",
            stage = "reducer",
            total = summary.total(),
            negative = summary.negative(),
            positive = summary.positive(),
            errors = summary.errors(),
            skipped = summary.skipped,
            partial = summary.partial,
            "reviewpipe.reduce.done"
        );

        if output.send(summary).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::INFO, event = "reviewpipe.downstream.closed", stage = "reducer", "reviewpipe.downstream.closed");
        }
        Ok(())
    }
}
