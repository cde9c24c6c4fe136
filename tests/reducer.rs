use reviewpipe::classify::Sentiment;
use reviewpipe::error::Result;
use reviewpipe::pipeline::reducer::Reducer;
use reviewpipe::pipeline::worker::Partial;
use reviewpipe::prelude::*;
use reviewpipe::stats::Tally;

fn partial(worker: usize, negatives: u64, cancelled: bool) -> Partial {
    let mut tally = Tally::default();
    for _ in 0..negatives {
        tally.observe(2.0, Some(Sentiment::Negative));
    }
    Partial {
        worker,
        tally,
        cancelled,
    }
}

async fn reduce(partials: Vec<Partial>, cancel_first: bool) -> Result<Summary> {
    let (tx, mut rx, cancel, handle) = Runtime::new().buffer(4).spawn(Reducer::default());
    for p in partials {
        tx.send(p).await.expect("reducer alive");
    }
    if cancel_first {
        cancel.cancel();
    }
    drop(tx);

    let summary = rx.recv().await.expect("one summary");
    assert!(rx.recv().await.is_none());
    handle.await??;
    Ok(summary)
}

#[tokio::test]
async fn late_cancel_after_drained_queue_is_not_partial() -> Result<()> {
    let summary = reduce(vec![partial(0, 2, false), partial(1, 1, false)], true).await?;
    assert!(!summary.partial);
    assert_eq!(summary.negative(), 3);
    assert_eq!(summary.mean_negative_rating(), Some(2.0));
    Ok(())
}

#[tokio::test]
async fn any_cancelled_worker_marks_the_run_partial() -> Result<()> {
    let summary = reduce(vec![partial(0, 2, false), partial(1, 0, true)], false).await?;
    assert!(summary.partial);
    assert_eq!(summary.negative(), 2);
    Ok(())
}

#[tokio::test]
async fn no_partials_gives_empty_summary() -> Result<()> {
    let summary = reduce(Vec::new(), false).await?;
    assert_eq!(summary.total(), 0);
    assert!(!summary.partial);
    assert_eq!(summary.mean_negative_rating(), None);
    Ok(())
}
