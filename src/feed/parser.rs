use feed_rs::parser;

/// The searchable text of one feed item.
///
/// Missing fields are empty strings so that matchers can scan every item
/// uniformly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
}

/// Parses an RSS or Atom document into its items, in document order.
///
/// The description is the RSS `<description>` (Atom `<summary>`), falling
/// back to the entry's content body.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, parser::ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            FeedItem { title, description }
        })
        .collect();

    Ok(items)
}
