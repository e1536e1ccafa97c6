//! Concurrent fan-out search over a feed list.
//!
//! A [`Registry`] maps feed types to [`Matcher`] strategies. [`run`] loads
//! the feeds, spawns one worker per feed, and streams every match through a
//! bounded channel into a [`ResultSink`]. A completion monitor closes the
//! channel once all workers have finished, which ends the run.
//!
//! # Example
//!
//! ```ignore
//! use sift::feed::JsonFeedFile;
//! use sift::search::{run, Registry, RssMatcher, RunOptions, TextSink};
//!
//! let registry = Registry::builder().register("rss", RssMatcher::default())?.build();
//! let mut sink = TextSink::new(std::io::stdout());
//! run(&JsonFeedFile::new("data/feeds.json"), &registry, "president", &RunOptions::default(), &mut sink).await?;
//! ```

mod default;
mod dispatch;
mod display;
mod matcher;
mod registry;
mod rss;
mod run;

pub use default::DefaultMatcher;
pub use dispatch::{
    match_feed, result_channel, spawn_monitor, spawn_workers, MonitorReport, ResultReceiver,
    ResultSender, WorkerOptions,
};
pub use display::{drain, DisplaySummary, ResultSink, TextSink};
pub use matcher::{MatchError, Matcher, SearchContext, SearchResult};
pub use registry::{Registry, RegistryBuilder, RegistryError, DEFAULT_FEED_TYPE};
pub use rss::{RssMatcher, DESCRIPTION_FIELD, TITLE_FIELD};
pub use run::{run, RunError, RunOptions, RunSummary};
