//! reviewpipe - classify every review in an NDJSON dump and print the
//! negative/positive breakdown.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use reviewpipe::config::{DEFAULT_CHUNK_SIZE, DEFAULT_NUM_WORKERS, DEFAULT_QUEUE_CAPACITY};
use reviewpipe::prelude::*;
use reviewpipe::source::fetch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sentiment breakdown of a product-review dump
#[derive(Parser, Debug)]
#[command(name = "reviewpipe")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "input"])))]
struct Cli {
    /// URL of the review file (.jsonl or .jsonl.gz); fetched once into --data-dir
    #[arg(short, long, env = "REVIEWPIPE_URL")]
    url: Option<String>,

    /// Local NDJSON review file
    #[arg(short, long, env = "REVIEWPIPE_INPUT")]
    input: Option<PathBuf>,

    /// Directory downloads and decompressed files are kept in
    #[arg(long, default_value = ".", env = "REVIEWPIPE_DATA_DIR")]
    data_dir: PathBuf,

    /// Number of classification workers
    #[arg(short, long, default_value_t = DEFAULT_NUM_WORKERS, env = "REVIEWPIPE_WORKERS")]
    workers: usize,

    /// Reviews per batch
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "REVIEWPIPE_CHUNK_SIZE")]
    chunk_size: usize,

    /// Batches the work queue holds before reading pauses
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, env = "REVIEWPIPE_QUEUE_CAPACITY")]
    queue_capacity: usize,

    /// Stop after this long and report what was processed (e.g. "30s", "5m")
    #[arg(long, value_parser = humantime::parse_duration, env = "REVIEWPIPE_TIMEOUT")]
    timeout: Option<Duration>,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", env = "REVIEWPIPE_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = PipelineConfig::default()
        .with_num_workers(cli.workers)
        .with_chunk_size(cli.chunk_size)
        .with_queue_capacity(cli.queue_capacity);
    config.validate()?;

    let path = match (&cli.input, &cli.url) {
        (Some(path), _) => path.clone(),
        (None, Some(url)) => {
            let bar = download_bar(cli.no_progress)?;
            let path = fetch::ensure_local(url, &cli.data_dir, &bar)
                .await
                .with_context(|| format!("failed to fetch {url}"))?;
            bar.finish_and_clear();
            path
        }
        (None, None) => bail!("one of --url or --input is required"),
    };

    let total = fetch::count_lines(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let bar = records_bar(total, cli.no_progress)?;

    let cancel = CancelToken::new();
    if let Some(timeout) = cli.timeout {
        cancel.cancel_after(timeout);
    }
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing with partial statistics");
            on_interrupt.cancel();
        }
    });

    let summary = Analyzer::new(LexiconClassifier::new())
        .config(config)
        .progress(bar.clone())
        .run_file(&path, cancel)
        .await
        .with_context(|| format!("failed to process {}", path.display()))?;
    bar.finish_and_clear();

    print!("{summary}");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log filter `{level}`"))?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn download_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::no_length();
    bar.set_style(ProgressStyle::with_template(
        "Downloading [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )?);
    Ok(bar)
}

fn records_bar(total: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} Processing reviews [{bar:40}] {human_pos}/{human_len} ({per_sec}, {eta})",
    )?);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}
