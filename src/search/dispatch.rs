//! Worker fan-out and the completion monitor.
//!
//! Every worker owns a clone of the result sender; the monitor owns the
//! original. The monitor drops its sender only after the last worker has
//! been joined, so the result channel closes exactly once and never before
//! a worker has finished sending.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::matcher::{MatchError, Matcher, SearchContext, SearchResult};
use super::registry::Registry;
use crate::feed::Feed;

pub type ResultSender = mpsc::Sender<SearchResult>;
pub type ResultReceiver = mpsc::Receiver<SearchResult>;

/// Creates the shared result channel.
///
/// tokio channels cannot be zero-capacity, so `capacity` is clamped to at
/// least 1: a producer is never more than `capacity` results ahead of the
/// sink.
pub fn result_channel(capacity: usize) -> (ResultSender, ResultReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Settings shared by every worker of a run.
#[derive(Debug, Clone, Default)]
pub struct WorkerOptions {
    /// Cancels every in-flight search when triggered.
    pub cancel: CancellationToken,
    /// Deadline for a single feed's search. `None` waits indefinitely.
    pub feed_timeout: Option<Duration>,
}

/// Counts reported by the completion monitor once every worker is joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Workers that ran to completion, including those whose search failed.
    pub completed: usize,
    /// Workers that panicked or were aborted.
    pub panicked: usize,
    /// Results sent onto the channel across all workers.
    pub sent: usize,
}

/// Runs `matcher` against `feed` and forwards its results to `results`.
///
/// A failed, timed-out or cancelled search is logged and sends nothing.
/// Results are sent one at a time in the order the matcher produced them;
/// each send waits for channel capacity. Returns the number sent.
pub async fn match_feed(
    matcher: &dyn Matcher,
    feed: &Feed,
    term: &str,
    results: &ResultSender,
    options: &WorkerOptions,
) -> usize {
    let ctx = SearchContext {
        cancel: options.cancel.clone(),
    };

    let search = async {
        match options.feed_timeout {
            Some(deadline) => tokio::time::timeout(deadline, matcher.search(feed, term, &ctx))
                .await
                .unwrap_or_else(|_| Err(MatchError::Timeout)),
            None => matcher.search(feed, term, &ctx).await,
        }
    };

    let outcome = tokio::select! {
        biased;
        _ = options.cancel.cancelled() => Err(MatchError::Cancelled),
        outcome = search => outcome,
    };

    let found = match outcome {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                feed = %feed.name,
                feed_type = %feed.feed_type,
                error = %e,
                "Feed search failed"
            );
            return 0;
        }
    };

    let mut sent = 0;
    for result in found {
        if results.send(result).await.is_err() {
            tracing::warn!(feed = %feed.name, "Result channel closed (receiver dropped)");
            break;
        }
        sent += 1;
    }

    tracing::debug!(feed = %feed.name, sent = sent, "Feed search finished");
    sent
}

/// Spawns one worker per feed, each bound to the matcher its feed type
/// resolves to.
///
/// The returned set is the outstanding-worker count; hand it to
/// [`spawn_monitor`] together with the original sender.
pub fn spawn_workers(
    registry: &Registry,
    feeds: Vec<Feed>,
    term: Arc<str>,
    results: &ResultSender,
    options: &WorkerOptions,
) -> JoinSet<usize> {
    let mut workers = JoinSet::new();

    for feed in feeds {
        let matcher = registry.lookup(&feed.feed_type);
        let term = Arc::clone(&term);
        let results = results.clone();
        let options = options.clone();

        workers.spawn(async move {
            match_feed(matcher.as_ref(), &feed, &term, &results, &options).await
        });
    }

    workers
}

/// Spawns the task that waits for every worker, then closes the result
/// channel by dropping `closer`.
///
/// `closer` must be the last sender not owned by a worker. Aborting the
/// returned handle drops the worker set, which aborts every worker in it.
pub fn spawn_monitor(
    mut workers: JoinSet<usize>,
    closer: ResultSender,
) -> JoinHandle<MonitorReport> {
    tokio::spawn(async move {
        let mut report = MonitorReport::default();

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(sent) => {
                    report.completed += 1;
                    report.sent += sent;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Search worker did not complete");
                    report.panicked += 1;
                }
            }
        }

        drop(closer);
        tracing::debug!(
            completed = report.completed,
            panicked = report.panicked,
            "All workers finished, result channel closed"
        );
        report
    })
}
