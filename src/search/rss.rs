use async_trait::async_trait;
use regex::Regex;

use super::matcher::{MatchError, Matcher, SearchContext, SearchResult};
use crate::feed::{fetch_document, parse_feed, Feed, FeedItem, FetchLimits};

/// Field label for matches in an item's title.
pub const TITLE_FIELD: &str = "Title";
/// Field label for matches in an item's description.
pub const DESCRIPTION_FIELD: &str = "Description";

/// Matcher for RSS and Atom feeds fetched over HTTP.
///
/// The search term is a case-sensitive regular expression applied to each
/// item's title and description independently.
#[derive(Debug, Clone)]
pub struct RssMatcher {
    client: reqwest::Client,
    limits: FetchLimits,
}

impl RssMatcher {
    pub fn new(client: reqwest::Client, limits: FetchLimits) -> Self {
        Self { client, limits }
    }
}

impl Default for RssMatcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), FetchLimits::default())
    }
}

#[async_trait]
impl Matcher for RssMatcher {
    async fn search(
        &self,
        feed: &Feed,
        term: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<SearchResult>, MatchError> {
        tracing::debug!(
            feed_type = %feed.feed_type,
            site = %feed.name,
            uri = %feed.uri,
            "Searching feed"
        );

        if feed.uri.is_empty() {
            return Err(MatchError::MissingUri(feed.name.clone()));
        }

        let pattern = Regex::new(term)?;

        let bytes = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(MatchError::Cancelled),
            fetched = fetch_document(&self.client, &feed.uri, self.limits) => fetched?,
        };

        let items = parse_feed(&bytes).map_err(|e| MatchError::Parse(e.to_string()))?;
        Ok(match_items(&items, &pattern))
    }
}

/// Scans title then description of every item, one result per matching
/// field.
fn match_items(items: &[FeedItem], pattern: &Regex) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for item in items {
        if pattern.is_match(&item.title) {
            results.push(SearchResult::new(TITLE_FIELD, item.title.as_str()));
        }
        if pattern.is_match(&item.description) {
            results.push(SearchResult::new(DESCRIPTION_FIELD, item.description.as_str()));
        }
    }
    results
}
