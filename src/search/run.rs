use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::dispatch::{result_channel, spawn_monitor, spawn_workers, MonitorReport, WorkerOptions};
use super::display::{drain, ResultSink};
use super::registry::Registry;
use crate::feed::{FeedError, FeedSource};

/// Errors that end a search run.
///
/// Per-feed failures are not among them; those are logged by the worker
/// that hit them.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to load feeds: {0}")]
    Load(#[from] FeedError),

    #[error("Failed to display results: {0}")]
    Display(#[from] std::io::Error),
}

/// Settings for one search run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Result channel capacity (clamped to at least 1).
    pub channel_capacity: usize,
    /// Deadline for each feed's search. `None` waits indefinitely.
    pub feed_timeout: Option<Duration>,
    /// Cancels all in-flight searches; the run still drains and returns.
    pub cancel: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
            feed_timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Feeds loaded, one worker each.
    pub feeds: usize,
    /// Results the sink accepted.
    pub rendered: usize,
    /// Workers that panicked instead of finishing.
    pub panicked: usize,
}

/// Aborts the monitor if the run is dropped before it finishes. The monitor
/// owns the worker set, so aborting it aborts every outstanding worker too.
struct MonitorGuard(JoinHandle<MonitorReport>);

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Searches every feed from `source` for `term` and streams the matches
/// into `sink`.
///
/// 1. Load the feed list; failure aborts the run before anything starts.
/// 2. Spawn one worker per feed with the matcher its type resolves to.
/// 3. Spawn the completion monitor, which closes the result channel once
///    every worker has finished.
/// 4. Drain the channel into `sink` on the calling task.
///
/// Returns after the sink has seen the channel close. Dropping the returned
/// future early aborts every worker still running.
pub async fn run<S: ResultSink + ?Sized>(
    source: &dyn FeedSource,
    registry: &Registry,
    term: &str,
    options: &RunOptions,
    sink: &mut S,
) -> Result<RunSummary, RunError> {
    let feeds = source.load().await?;
    let feed_count = feeds.len();
    tracing::info!(feeds = feed_count, term = %term, "Starting search");

    let (results_tx, results_rx) = result_channel(options.channel_capacity);
    let worker_options = WorkerOptions {
        cancel: options.cancel.clone(),
        feed_timeout: options.feed_timeout,
    };

    let workers = spawn_workers(
        registry,
        feeds,
        Arc::from(term),
        &results_tx,
        &worker_options,
    );
    // The monitor takes the last sender outside the workers.
    let mut monitor = MonitorGuard(spawn_monitor(workers, results_tx));

    let displayed = drain(results_rx, sink).await;

    let report = match (&mut monitor.0).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Completion monitor did not finish");
            Default::default()
        }
    };

    let displayed = displayed?;
    tracing::info!(
        feeds = feed_count,
        results = displayed.rendered,
        "Search complete"
    );

    Ok(RunSummary {
        feeds: feed_count,
        rendered: displayed.rendered,
        panicked: report.panicked,
    })
}
