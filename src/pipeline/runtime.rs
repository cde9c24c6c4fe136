use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::{StageConfig, STAGE_CONFIG};
use crate::pipeline::pipe::Pipe;

pub struct Runtime {
    buffer: usize,
    stage_buffers: HashMap<&'static str, usize>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            buffer: 128,
            stage_buffers: HashMap::new(),
        }
    }

    /// Default capacity of every inter-stage channel.
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Capacity of the channel fed by `stage`, overriding [`buffer`](Self::buffer).
    pub fn buffer_stage(mut self, stage: &'static str, buffer: usize) -> Self {
        self.stage_buffers.insert(stage, buffer.max(1));
        self
    }

    pub fn spawn<I, O, P>(
        &self,
        pipe: P,
    ) -> (
        mpsc::Sender<I>,
        mpsc::Receiver<O>,
        CancelToken,
        JoinHandle<Result<()>>,
    )
    where
        I: Send + 'static,
        O: Send + 'static,
        P: Pipe<I, O> + Send + Sync + 'static,
    {
        let cancel = CancelToken::default();
        let (tx, rx, handle) = self.spawn_with_cancel(pipe, cancel.clone());
        (tx, rx, cancel, handle)
    }

    /// Like [`spawn`](Self::spawn), but observes a caller-owned token.
    pub fn spawn_with_cancel<I, O, P>(
        &self,
        pipe: P,
        cancel: CancelToken,
    ) -> (mpsc::Sender<I>, mpsc::Receiver<O>, JoinHandle<Result<()>>)
    where
        I: Send + 'static,
        O: Send + 'static,
        P: Pipe<I, O> + Send + Sync + 'static,
    {
        let (tx_in, rx_in) = mpsc::channel::<I>(self.buffer);
        let (tx_out, rx_out) = mpsc::channel::<O>(self.buffer);

        let buffer = self.buffer;
        let stage_config = StageConfig {
            buffers: Arc::new(self.stage_buffers.clone()),
        };

        #[cfg(feature = "tracing")]
        let handle = {
            use tracing::Instrument;
            let stage = pipe.stage_name();
            let span = tracing::info_span!("reviewpipe.stage", stage = stage, buffer = buffer);
            tokio::spawn(
                STAGE_CONFIG
                    .scope(stage_config, async move {
                        pipe.process(rx_in, tx_out, buffer, cancel).await
                    })
                    .instrument(span),
            )
        };

        #[cfg(not(feature = "tracing"))]
        let handle = tokio::spawn(STAGE_CONFIG.scope(stage_config, async move {
            pipe.process(rx_in, tx_out, buffer, cancel).await
        }));

        (tx_in, rx_out, handle)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
