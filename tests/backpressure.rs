use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reviewpipe::error::Result;
use reviewpipe::pipeline::batcher::{Batch, Batcher};
use reviewpipe::pipeline::pipe::Pipe;
use reviewpipe::prelude::*;
use tokio::sync::mpsc::{Receiver, Sender};

/// Emits increasing integers forever, counting completed sends.
struct CountingSource {
    sent: Arc<AtomicUsize>,
}

#[async_trait]
impl Pipe<(), u64> for CountingSource {
    fn stage_name(&self) -> &'static str {
        "counting_source"
    }

    async fn process(
        &self,
        mut input: Receiver<()>,
        output: Sender<u64>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        let _ = input.recv().await;
        let mut n = 0_u64;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                sent = output.send(n) => {
                    if sent.is_err() {
                        return Ok(());
                    }
                    self.sent.fetch_add(1, Ordering::SeqCst);
                    n += 1;
                }
            }
        }
    }
}

/// Never pulls from the work queue until cancelled.
struct StalledConsumer;

#[async_trait]
impl Pipe<Batch<u64>, ()> for StalledConsumer {
    async fn process(
        &self,
        _input: Receiver<Batch<u64>>,
        _output: Sender<()>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        cancel.cancelled().await;
        Ok(())
    }
}

#[tokio::test]
async fn full_queue_stalls_the_producer() -> Result<()> {
    const CAPACITY: usize = 3;
    const CHUNK: usize = 4;

    let sent = Arc::new(AtomicUsize::new(0));
    let rt = Runtime::new().buffer(1).buffer_stage("batcher", CAPACITY);
    let pipe = CountingSource { sent: sent.clone() }
        .pipe::<Batch<u64>, _>(Batcher::new(CHUNK))
        .pipe::<(), _>(StalledConsumer);
    let (tx, _rx, cancel, handle) = rt.spawn(pipe);
    tx.send(()).await.expect("start");

    tokio::time::sleep(Duration::from_millis(100)).await;
    let first = sent.load(Ordering::SeqCst);

    // Queued batches, one batch blocked in push, one item in the line channel.
    let bound = CAPACITY * CHUNK + CHUNK + 1;
    assert!(first >= CAPACITY * CHUNK, "queue never filled: {first}");
    assert!(first <= bound, "producer ran ahead of the queue: {first} > {bound}");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sent.load(Ordering::SeqCst), first, "producer kept going");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cancel must unblock the batcher")??;
    Ok(())
}

#[tokio::test]
async fn stage_buffer_overrides_beat_the_default() -> Result<()> {
    let sent = Arc::new(AtomicUsize::new(0));
    // The default would let 64 items through; the named stages stay tight.
    let rt = Runtime::new()
        .buffer(64)
        .buffer_stage("counting_source", 1)
        .buffer_stage("batcher", 1);
    let pipe = CountingSource { sent: sent.clone() }
        .pipe::<Batch<u64>, _>(Batcher::new(1))
        .pipe::<(), _>(StalledConsumer);
    let (tx, _rx, cancel, handle) = rt.spawn(pipe);
    tx.send(()).await.expect("start");

    tokio::time::sleep(Duration::from_millis(100)).await;
    // One queued batch, one batch in push, one item in the source channel.
    assert!(sent.load(Ordering::SeqCst) <= 3);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("pipeline stops on cancel")??;
    Ok(())
}
