use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::opml::parse_opml_content;
use super::types::{Feed, FeedError};

/// Produces the list of feeds a search run fans out over.
///
/// A failure here is fatal to the run that requested it.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Feed>, FeedError>;
}

/// An in-memory feed list.
#[async_trait]
impl FeedSource for Vec<Feed> {
    async fn load(&self) -> Result<Vec<Feed>, FeedError> {
        Ok(self.clone())
    }
}

/// A JSON feed list: an array of `{"site", "link", "type"}` records.
#[derive(Debug, Clone)]
pub struct JsonFeedFile {
    path: PathBuf,
}

impl JsonFeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for JsonFeedFile {
    async fn load(&self) -> Result<Vec<Feed>, FeedError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: path.clone(),
                source,
            })?;

        let feeds: Vec<Feed> =
            serde_json::from_slice(&content).map_err(|source| FeedError::Decode {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path, feeds = feeds.len(), "Loaded JSON feed list");
        Ok(feeds)
    }
}

/// An OPML subscription list. Every outline with an `xmlUrl` becomes a feed.
#[derive(Debug, Clone)]
pub struct OpmlFeedFile {
    path: PathBuf,
}

impl OpmlFeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for OpmlFeedFile {
    async fn load(&self) -> Result<Vec<Feed>, FeedError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: path.clone(),
                source,
            })?;

        let feeds = parse_opml_content(&content)?;
        tracing::debug!(path = %path, feeds = feeds.len(), "Loaded OPML feed list");
        Ok(feeds)
    }
}

/// Picks a feed source for `path` by extension: `.opml`/`.xml` are read as
/// OPML, everything else as JSON.
pub fn source_for_path(path: &Path) -> Box<dyn FeedSource> {
    let is_opml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("opml") || ext.eq_ignore_ascii_case("xml"));

    if is_opml {
        Box::new(OpmlFeedFile::new(path))
    } else {
        Box::new(JsonFeedFile::new(path))
    }
}
