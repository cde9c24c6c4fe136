use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::pipe::Pipe;

/// An ordered group of items handed to one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// Position of this batch in the stream, starting at 0.
    pub seq: u64,
    pub items: Vec<T>,
}

/// Groups a stream of items into [`Batch`]es of `chunk_size`.
///
/// Every batch but the last holds exactly `chunk_size` items. The output
/// channel is the bounded work queue: pushing blocks while it is full, and
/// returning from [`process`](Pipe::process) closes it. If cancellation
/// fires first, the batch being built or pushed is dropped.
pub struct Batcher<T> {
    chunk_size: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Batcher<T> {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Batcher<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

enum PushOutcome {
    Sent,
    Stop,
}

impl<T: Send + 'static> Batcher<T> {
    async fn push(
        &self,
        batch: Batch<T>,
        output: &Sender<Batch<T>>,
        cancel: &CancelToken,
    ) -> PushOutcome {
        #[cfg(feature = "tracing")]
        let seq = batch.seq;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = "batcher", where_ = "send", seq = seq, "reviewpipe.cancelled");
                PushOutcome::Stop
            },
            sent = output.send(batch) => {
                if sent.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::INFO, event = "reviewpipe.downstream.closed", stage = "batcher", "reviewpipe.downstream.closed");
                    PushOutcome::Stop
                } else {
                    PushOutcome::Sent
                }
            }
        }
    }
}

#[async_trait]
impl<T> Pipe<T, Batch<T>> for Batcher<T>
where
    T: Send + 'static,
{
    fn stage_name(&self) -> &'static str {
        "batcher"
    }

    async fn process(
        &self,
        mut input: Receiver<T>,
        output: Sender<Batch<T>>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let stage = self.stage_name();

        let mut items = Vec::with_capacity(self.chunk_size);
        let mut seq = 0_u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = stage, where_ = "recv", buffered = items.len(), "reviewpipe.cancelled");
                    return Ok(());
                },
                msg = input.recv() => {
                    let Some(item) = msg else { break; };
                    items.push(item);
                    if items.len() < self.chunk_size {
                        continue;
                    }
                    let full = std::mem::replace(&mut items, Vec::with_capacity(self.chunk_size));
                    let batch = Batch { seq, items: full };
                    seq += 1;
                    if let PushOutcome::Stop = self.push(batch, &output, &cancel).await {
                        return Ok(());
                    }
                }
            }
        }

        if !items.is_empty() {
            // Stop and Sent both end the stage.
            let _ = self.push(Batch { seq, items }, &output, &cancel).await;
        }

        // Dropping `output` closes the work queue.
        Ok(())
    }
}
