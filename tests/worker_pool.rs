use std::collections::BTreeSet;
use std::sync::Arc;

use reviewpipe::classify::Sentiment;
use reviewpipe::error::{Error, Result};
use reviewpipe::pipeline::batcher::Batch;
use reviewpipe::pipeline::worker::{Partial, WorkerPool};
use reviewpipe::prelude::*;
use reviewpipe::record::Review;
use reviewpipe::stats::{Counters, Tally};

mod common;
use common::{by_rating, reviews, VecSource};

fn batches(count: usize, per_batch: usize) -> Vec<Batch<Review>> {
    (0..count)
        .map(|seq| Batch {
            seq: seq as u64,
            items: reviews(&vec![1; per_batch]),
        })
        .collect()
}

async fn run_pool<C>(pool: WorkerPool<C>, input: Vec<Batch<Review>>) -> (Vec<Partial>, Result<()>)
where
    C: reviewpipe::classify::Classifier + ?Sized + 'static,
{
    let rt = Runtime::new().buffer(2);
    let pipe = VecSource::new(input).pipe::<Partial, _>(pool);
    let (tx, mut rx, _cancel, handle) = rt.spawn(pipe);
    tx.send(()).await.expect("start");
    drop(tx);

    let mut partials = Vec::new();
    while let Some(p) = rx.recv().await {
        partials.push(p);
    }
    (partials, handle.await.expect("pool task"))
}

#[tokio::test]
async fn every_worker_reports_exactly_once() -> Result<()> {
    let pool = WorkerPool::new(Arc::new(by_rating)).workers(4);
    let (partials, res) = run_pool(pool, batches(10, 3)).await;
    res?;

    assert_eq!(partials.len(), 4);
    let ids: BTreeSet<usize> = partials.iter().map(|p| p.worker).collect();
    assert_eq!(ids, (0..4).collect());
    assert!(partials.iter().all(|p| !p.cancelled));

    let total: Tally = partials.iter().map(|p| p.tally).sum();
    assert_eq!(total.negative, 30);
    assert_eq!(total.negative_rating_sum, 30.0);
    Ok(())
}

#[tokio::test]
async fn idle_workers_report_empty_tallies() -> Result<()> {
    let pool = WorkerPool::new(Arc::new(by_rating)).workers(8);
    let (partials, res) = run_pool(pool, batches(2, 5)).await;
    res?;

    assert_eq!(partials.len(), 8);
    let busy = partials.iter().filter(|p| p.tally != Tally::default()).count();
    assert!((1..=2).contains(&busy));
    assert_eq!(partials.iter().map(|p| p.tally.total()).sum::<u64>(), 10);
    Ok(())
}

#[tokio::test]
async fn shared_counters_track_every_record() -> Result<()> {
    let counters = Arc::new(Counters::new());
    let pool = WorkerPool::new(Arc::new(by_rating))
        .workers(3)
        .counters(counters.clone());
    let (_partials, res) = run_pool(pool, batches(5, 4)).await;
    res?;

    let snap = counters.snapshot();
    assert_eq!(snap.total, 20);
    assert_eq!(snap.negative, 20);
    assert_eq!(snap.positive, 0);
    Ok(())
}

#[tokio::test]
async fn panicking_classifier_fails_the_stage() {
    let classifier = |text: &str| -> Sentiment {
        if text.ends_with('1') {
            panic!("classifier blew up");
        }
        Sentiment::Positive
    };
    let pool = WorkerPool::new(Arc::new(classifier)).workers(2);

    let run = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        run_pool(pool, batches(50, 2)),
    )
    .await
    .expect("pool must shut down after a worker panics");

    let (partials, res) = run;
    assert!(matches!(res, Err(Error::Join(_))));
    // The surviving worker still reports.
    assert!(partials.len() <= 1);
}

#[tokio::test]
async fn zero_workers_still_runs_one() -> Result<()> {
    let pool = WorkerPool::new(Arc::new(by_rating)).workers(0);
    let (partials, res) = run_pool(pool, batches(3, 2)).await;
    res?;
    assert_eq!(partials.len(), 1);
    assert_eq!(partials[0].tally.total(), 6);
    Ok(())
}
