use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::feed::{Feed, FetchError};

/// One matched field of a feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Name of the field that matched (e.g. `"Title"`).
    pub field: String,
    /// Full text of the matching field.
    pub content: String,
}

impl SearchResult {
    pub fn new(field: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            content: content.into(),
        }
    }
}

/// Why a single feed produced no results.
///
/// These never abort a run; the worker logs them and the feed contributes
/// nothing.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("No feed URI provided for '{0}'")]
    MissingUri(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid search term: {0}")]
    InvalidTerm(#[from] regex::Error),

    #[error("Search timed out")]
    Timeout,

    #[error("Search cancelled")]
    Cancelled,
}

/// Per-call context handed to [`Matcher::search`].
///
/// Matchers that do long-running work should observe `cancel` themselves;
/// the dispatcher also races every call against it.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub cancel: CancellationToken,
}

/// A searching strategy for one feed type.
///
/// Implementations are registered by feed type in a
/// [`Registry`](super::Registry) and shared across workers, so they must be
/// `Send + Sync` and hold no per-search state.
#[async_trait]
pub trait Matcher: Send + Sync {
    /// Searches `feed` for `term`, returning matches in the order found.
    async fn search(
        &self,
        feed: &Feed,
        term: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<SearchResult>, MatchError>;
}
