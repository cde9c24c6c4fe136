use reviewpipe::classify::Sentiment;
use reviewpipe::stats::{CounterSnapshot, Counters, Summary, Tally};

fn tally(observations: &[(f64, Option<Sentiment>)]) -> Tally {
    let mut t = Tally::default();
    for &(rating, outcome) in observations {
        t.observe(rating, outcome);
    }
    t
}

#[test]
fn observe_routes_each_outcome() {
    let t = tally(&[
        (1.0, Some(Sentiment::Negative)),
        (2.0, Some(Sentiment::Negative)),
        (5.0, Some(Sentiment::Positive)),
        (1.0, None),
    ]);
    assert_eq!(t.negative, 2);
    assert_eq!(t.positive, 1);
    assert_eq!(t.errors, 1);
    assert_eq!(t.total(), 4);
    assert_eq!(t.negative_rating_sum, 3.0);
    assert_eq!(t.mean_negative_rating(), Some(1.5));
}

#[test]
fn default_is_the_merge_identity() {
    let t = tally(&[(1.0, Some(Sentiment::Negative)), (4.0, Some(Sentiment::Positive))]);
    assert_eq!(t.merge(Tally::default()), t);
    assert_eq!(Tally::default() + t, t);
    assert_eq!(Tally::default().total(), 0);
    assert_eq!(Tally::default().mean_negative_rating(), None);
}

#[test]
fn sum_of_partials_matches_one_pass() {
    let all = [
        (1.0, Some(Sentiment::Negative)),
        (5.0, Some(Sentiment::Positive)),
        (2.0, Some(Sentiment::Negative)),
        (3.0, None),
        (4.0, Some(Sentiment::Positive)),
    ];
    let whole = tally(&all);
    let parts: Tally = all.chunks(2).map(tally).sum();
    assert_eq!(parts, whole);

    let mut acc = Tally::default();
    for chunk in all.chunks(3).rev() {
        acc += tally(chunk);
    }
    assert_eq!(acc, whole);
}

#[test]
fn summary_percentages_over_all_records() {
    let t = tally(&[
        (1.0, Some(Sentiment::Negative)),
        (5.0, Some(Sentiment::Positive)),
        (5.0, Some(Sentiment::Positive)),
        (3.0, None),
    ]);
    let s = Summary::new(t, 0, false);
    assert_eq!(s.negative_percentage(), Some(25.0));
    assert_eq!(s.positive_percentage(), Some(50.0));
}

#[test]
fn summary_display_for_empty_run() {
    let s = Summary::new(Tally::default(), 0, false);
    assert_eq!(
        s.to_string(),
        "Total negative reviews: 0\n\
         Total positive reviews: 0\n\
         Average negative rating: none (no negative reviews observed)\n"
    );
}

#[test]
fn summary_display_notes_skips_and_cancellation() {
    let t = tally(&[(2.0, Some(Sentiment::Negative)), (4.0, Some(Sentiment::Positive))]);
    let s = Summary::new(t, 7, true);
    let printed = s.to_string();
    assert!(printed.contains("Percentage negative reviews: 50.00%"));
    assert!(printed.contains("Average negative rating: 2.00"));
    assert!(printed.contains("Skipped lines: 7"));
    assert!(printed.ends_with("Run was cancelled: statistics cover only the records processed\n"));
    assert!(!printed.contains("Unclassified"));
}

#[test]
fn counters_snapshot() {
    let counters = Counters::new();
    counters.record(Some(Sentiment::Negative));
    counters.record(Some(Sentiment::Positive));
    counters.record(Some(Sentiment::Positive));
    counters.record(None);
    counters.record_skipped();

    assert_eq!(counters.skipped(), 1);
    assert_eq!(
        counters.snapshot(),
        CounterSnapshot {
            negative: 1,
            positive: 2,
            errors: 1,
            total: 4,
            skipped: 1,
        }
    );
}

#[tokio::test]
async fn counters_are_exact_under_concurrency() {
    let counters = std::sync::Arc::new(Counters::new());
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let counters = counters.clone();
        tasks.spawn(async move {
            for _ in 0..1_000 {
                let outcome = if i % 2 == 0 { Sentiment::Negative } else { Sentiment::Positive };
                counters.record(Some(outcome));
            }
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.expect("task");
    }

    let snap = counters.snapshot();
    assert_eq!(snap.total, 8_000);
    assert_eq!(snap.negative, 4_000);
    assert_eq!(snap.positive, 4_000);
}
