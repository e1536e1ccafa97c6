//! Feed descriptors and the collaborators that load and retrieve them.
//!
//! - **Loading**: a [`FeedSource`] produces the feed list for a search run,
//!   from JSON ([`JsonFeedFile`]), OPML ([`OpmlFeedFile`]) or memory.
//! - **Fetching**: bounded HTTP retrieval of a feed document.
//! - **Parsing**: RSS/Atom items reduced to their searchable text.
//!
//! # Example
//!
//! ```ignore
//! use sift::feed::{FeedSource, JsonFeedFile};
//!
//! let feeds = JsonFeedFile::new("data/feeds.json").load().await?;
//! ```

mod fetcher;
mod loader;
mod opml;
mod parser;
mod types;

pub use fetcher::{fetch_document, FetchError, FetchLimits, MAX_FEED_SIZE};
pub use loader::{source_for_path, FeedSource, JsonFeedFile, OpmlFeedFile};
pub use opml::OpmlError;
pub use parser::{parse_feed, FeedItem};
pub use types::{Feed, FeedError};
