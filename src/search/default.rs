use async_trait::async_trait;

use super::matcher::{MatchError, Matcher, SearchContext, SearchResult};
use crate::feed::Feed;

/// Fallback matcher for feed types with no registered strategy.
///
/// Always yields no results.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMatcher;

#[async_trait]
impl Matcher for DefaultMatcher {
    async fn search(
        &self,
        _feed: &Feed,
        _term: &str,
        _ctx: &SearchContext,
    ) -> Result<Vec<SearchResult>, MatchError> {
        Ok(Vec::new())
    }
}
