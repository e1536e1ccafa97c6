use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use sift::config::Config;
use sift::feed::source_for_path;
use sift::search::{run, Registry, RssMatcher, RunOptions, TextSink};

/// Get the default config file path (~/.config/sift/config.toml)
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("sift")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(name = "sift", about = "Search RSS feeds concurrently for a term")]
struct Args {
    /// Term to search for (case-sensitive regular expression)
    term: Option<String>,

    /// Feed list to search (JSON, or OPML with .opml/.xml extension)
    #[arg(long, value_name = "FILE")]
    feeds: Option<PathBuf>,

    /// Config file (defaults to ~/.config/sift/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Deadline for each feed's search in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Truncate displayed content to this many columns (0 disables)
    #[arg(long, value_name = "COLS")]
    width: Option<usize>,

    /// Log per-feed progress
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the results
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config.or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };

    let feeds_path = args.feeds.unwrap_or_else(|| config.feeds_file.clone());
    let term = args.term.unwrap_or_else(|| config.default_term.clone());
    let feed_timeout = match args.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.feed_timeout(),
    };
    let width = args.width.unwrap_or(config.max_content_width);

    let limits = config.fetch_limits();
    let client = reqwest::Client::builder()
        .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
        .timeout(limits.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    // Duplicate registration is a startup error
    let registry = Registry::builder()
        .register("rss", RssMatcher::new(client, limits))
        .context("Failed to register matchers")?
        .build();
    tracing::debug!(feed_types = ?registry.feed_types(), "Matchers registered");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight searches");
            interrupt.cancel();
        }
    });

    let options = RunOptions {
        channel_capacity: config.channel_capacity,
        feed_timeout,
        cancel,
    };

    let source = source_for_path(&feeds_path);
    let mut sink = TextSink::new(std::io::stdout()).with_max_content_width(width);

    let summary = run(source.as_ref(), &registry, &term, &options, &mut sink)
        .await
        .with_context(|| format!("Search of {} failed", feeds_path.display()))?;

    tracing::debug!(
        feeds = summary.feeds,
        results = summary.rendered,
        panicked = summary.panicked,
        "Done"
    );
    Ok(())
}
