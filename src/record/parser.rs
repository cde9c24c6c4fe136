use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::pipe::Pipe;
use crate::record::Review;
use crate::stats::Counters;

/// Decodes raw lines into [`Review`]s.
///
/// A line that fails to decode is logged, counted as skipped and dropped;
/// it never stops the stream.
pub struct RecordParser {
    counters: Arc<Counters>,
}

impl RecordParser {
    pub fn new(counters: Arc<Counters>) -> Self {
        Self { counters }
    }
}

#[async_trait]
impl Pipe<Bytes, Review> for RecordParser {
    fn stage_name(&self) -> &'static str {
        "record_parser"
    }

    async fn process(
        &self,
        mut input: Receiver<Bytes>,
        output: Sender<Review>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let stage = self.stage_name();

        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = stage, where_ = "recv", "reviewpipe.cancelled");
                    break;
                },
                msg = input.recv() => {
                    let Some(line) = msg else { break; };
                    line
                }
            };

            let review = match Review::parse_bytes(&line) {
                Ok(review) => review,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(
                        tracing::Level::WARN,
                        event = "reviewpipe.parse.skipped",
                        stage = stage,
                        bytes = line.len(),
                        preview = %crate::record::preview(&line),
                        error = %_err,
                        "reviewpipe.parse.skipped"
                    );
                    self.counters.record_skipped();
                    continue;
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = stage, where_ = "send", "reviewpipe.cancelled");
                    break;
                },
                sent = output.send(review) => {
                    if sent.is_err() {
                        #[cfg(feature = "tracing")]
                        tracing::event!(tracing::Level::INFO, event = "reviewpipe.downstream.closed", stage = stage, "reviewpipe.downstream.closed");
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
