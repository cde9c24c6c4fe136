use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::STAGE_CONFIG;
use crate::pipeline::pipe::Pipe;

/// Two stages joined by a bounded channel.
///
/// The channel between `a` and `b` is sized by the buffer override
/// registered for `a`'s stage name, falling back to the global buffer.
pub struct Chain<A, B, M> {
    a: A,
    b: B,
    _m: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    pub fn new(a: A, b: B) -> Self {
        Self {
            a,
            b,
            _m: PhantomData,
        }
    }
}

#[async_trait]
impl<I, M, O, A, B> Pipe<I, O> for Chain<A, B, M>
where
    I: Send + 'static,
    M: Send + 'static,
    O: Send + 'static,
    A: Pipe<I, M> + Send + Sync,
    B: Pipe<M, O> + Send + Sync,
{
    fn stage_name(&self) -> &'static str {
        self.b.stage_name()
    }

    async fn process(
        &self,
        input: mpsc::Receiver<I>,
        output: mpsc::Sender<O>,
        buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        let upstream = self.a.stage_name();
        let mid_buffer = STAGE_CONFIG
            .try_with(|cfg| cfg.buffer_for(upstream, buffer))
            .unwrap_or(buffer)
            .max(1);
        let (tx_mid, rx_mid) = mpsc::channel::<M>(mid_buffer);

        // A failing side cancels the other so neither blocks forever.
        let left = async {
            let res = self.a.process(input, tx_mid, buffer, cancel.clone()).await;
            if res.is_err() {
                cancel.cancel();
            }
            res
        };
        let right = async {
            let res = self.b.process(rx_mid, output, buffer, cancel.clone()).await;
            if res.is_err() {
                cancel.cancel();
            }
            res
        };

        let (left_res, right_res) = tokio::join!(left, right);
        left_res?;
        right_res?;
        Ok(())
    }
}

pub trait PipeExt<I, O>: Pipe<I, O> + Sized
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn pipe<N, P2>(self, next: P2) -> Chain<Self, P2, O>
    where
        N: Send + 'static,
        P2: Pipe<O, N> + Send + Sync,
        Self: Send + Sync,
    {
        Chain::new(self, next)
    }
}

impl<I, O, P> PipeExt<I, O> for P
where
    I: Send + 'static,
    O: Send + 'static,
    P: Pipe<I, O> + Sized + Send + Sync,
{
}
