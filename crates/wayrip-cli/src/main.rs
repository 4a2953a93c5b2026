//! wayrip - rip a page and its assets out of the Wayback Machine.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wayrip_net::{DefaultRetryClassifier, HttpClient, RetryNet};
use wayrip_rip::{MAX_CONCURRENCY, RipOptions, Ripper};

/// Downloads one archived page with its full asset closure, strips the
/// archive toolbar and replay scripts, and rewrites every reference so the
/// copy renders offline from a single flat directory.
#[derive(Parser, Debug)]
#[command(name = "wayrip")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Snapshot URL, e.g. https://web.archive.org/web/20060101000000/http://example.com/
    url: String,

    /// Directory the page and its assets are written to
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Parallel downloads (capped at 3; the archive rate-limits hard)
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// File name for the saved page (defaults to the page's own name)
    #[arg(long)]
    savename: Option<String>,

    /// Forget previous downloads and fetch everything again
    #[arg(long)]
    reset: bool,

    /// Pause between fetches, in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if cli.concurrency > MAX_CONCURRENCY {
        tracing::warn!(
            requested = cli.concurrency,
            "concurrency capped at {MAX_CONCURRENCY}"
        );
    }

    let mut options = RipOptions::default()
        .with_output_dir(cli.output)
        .with_concurrency(cli.concurrency)
        .with_reset(cli.reset);
    if let Some(savename) = cli.savename {
        options = options.with_savename(savename);
    }
    if let Some(delay) = cli.delay {
        options.net.fetch_delay = Some(Duration::from_millis(delay));
    }

    let client = HttpClient::new(options.net.clone()).context("failed to build HTTP client")?;
    let net = Arc::new(RetryNet::new(
        client,
        options.net.retry_policy.clone(),
        DefaultRetryClassifier,
    ));

    let report = Ripper::new(net, options)
        .rip(&cli.url)
        .await
        .context("rip failed")?;

    println!(
        "saved {} ({} downloaded, {} already present)",
        report.page.display(),
        report.fetched,
        report.skipped
    );
    // Individual asset failures do not fail the run; only a root-page error
    // carries a non-zero exit.
    if !report.failed.is_empty() {
        eprintln!("{} asset(s) could not be downloaded:", report.failed.len());
        for asset in &report.failed {
            eprintln!("  {} ({})", asset.url, asset.reason);
        }
    }

    Ok(())
}
