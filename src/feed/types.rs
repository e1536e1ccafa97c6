use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named, typed data source.
///
/// The field names follow the feed list format (`site`, `link`, `type`).
/// Feeds are immutable once loaded; each worker owns the one it searches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Feed {
    /// Display name of the feed's site.
    #[serde(rename = "site")]
    pub name: String,
    /// Location of the feed document.
    #[serde(rename = "link")]
    pub uri: String,
    /// Feed type tag used to pick a matcher (e.g. `"rss"`).
    #[serde(rename = "type")]
    pub feed_type: String,
}

impl Feed {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        feed_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            feed_type: feed_type.into(),
        }
    }
}

/// Errors that can occur while loading a feed list.
///
/// Any of these aborts a search run: without a feed list there is no work.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to read feed list '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid feed list '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid OPML feed list: {0}")]
    Opml(#[from] super::opml::OpmlError),
}
