#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reviewpipe::classify::Sentiment;
use reviewpipe::error::Result;
use reviewpipe::pipeline::cancel::CancelToken;
use reviewpipe::pipeline::pipe::Pipe;
use reviewpipe::record::Review;
use tokio::sync::mpsc::{Receiver, Sender};

/// Emits a fixed list of items once started.
#[derive(Clone)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<T> Pipe<(), T> for VecSource<T>
where
    T: Send + Sync + Clone + 'static,
{
    fn stage_name(&self) -> &'static str {
        "vec_source"
    }

    async fn process(
        &self,
        mut input: Receiver<()>,
        output: Sender<T>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = input.recv() => {}
        }

        for item in self.items.iter().cloned() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = output.send(item) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

pub struct CollectSink<T> {
    out: Arc<Mutex<Vec<T>>>,
}

impl<T> CollectSink<T> {
    pub fn new(out: Arc<Mutex<Vec<T>>>) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<T> Pipe<T, ()> for CollectSink<T>
where
    T: Send + Sync + 'static,
{
    async fn process(
        &self,
        mut input: Receiver<T>,
        _output: Sender<()>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                msg = input.recv() => {
                    let Some(v) = msg else { break; };
                    self.out.lock().expect("mutex poisoned").push(v);
                }
            }
        }
        Ok(())
    }
}

/// One NDJSON line for a review whose text names its rating, e.g. `"stars 2"`.
pub fn review_line(rating: u32) -> Bytes {
    Bytes::from(format!(
        r#"{{"rating": {rating}.0, "title": "t", "text": "stars {rating}", "asin": "B000{rating}"}}"#
    ))
}

pub fn review_lines(ratings: &[u32]) -> Vec<Bytes> {
    ratings.iter().map(|&r| review_line(r)).collect()
}

/// Negative iff the trailing number in the text is at most 2.
pub fn by_rating(text: &str) -> Sentiment {
    let stars: u32 = text
        .rsplit(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(5);
    if stars <= 2 {
        Sentiment::Negative
    } else {
        Sentiment::Positive
    }
}

pub fn reviews(ratings: &[u32]) -> Vec<Review> {
    ratings
        .iter()
        .map(|&r| Review::new(format!("stars {r}"), f64::from(r)))
        .collect()
}
