use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::types::Feed;
use crate::util::validate_url;

/// Maximum nesting depth for outline elements.
const MAX_OPML_DEPTH: usize = 50;

/// Feed type assigned to outlines that do not carry a `type` attribute.
const DEFAULT_OUTLINE_TYPE: &str = "rss";

/// Errors that can occur while reading an OPML feed list.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// OPML nesting depth exceeds safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    #[error("XML parse error: {0}")]
    XmlParse(String),
}

/// Extracts feeds from an OPML document.
///
/// Every `<outline>` carrying an `xmlUrl` becomes a [`Feed`], at any nesting
/// depth. Folder outlines are traversed but not returned. Outlines whose URL
/// fails [`validate_url`] are skipped with a warning.
///
/// quick-xml (0.37) never expands `<!ENTITY>` declarations; custom
/// entity references surface as unescape errors instead of file contents.
pub(crate) fn parse_opml_content(content: &str) -> Result<Vec<Feed>, OpmlError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut feeds = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                depth += 1;
                if depth > MAX_OPML_DEPTH {
                    return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH));
                }
                if let Some(feed) = outline_to_feed(&e, &reader)? {
                    feeds.push(feed);
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"outline" => {
                if let Some(feed) = outline_to_feed(&e, &reader)? {
                    feeds.push(feed);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"outline" => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpmlError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(feeds)
}

fn outline_to_feed(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Option<Feed>, OpmlError> {
    let mut xml_url = None;
    let mut title = None;
    let mut text = None;
    let mut outline_type = None;

    let decoder = reader.decoder();
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed OPML attribute");
                continue;
            }
        };
        let value = || {
            attr.decode_and_unescape_value(decoder)
                .map(|v| v.trim().to_string())
                .map_err(|e| OpmlError::XmlParse(e.to_string()))
        };
        match attr.key.as_ref() {
            b"xmlUrl" => xml_url = Some(value()?),
            b"title" => title = Some(value()?),
            b"text" => text = Some(value()?),
            b"type" => outline_type = Some(value()?),
            _ => {}
        }
    }

    let Some(url) = xml_url else {
        return Ok(None);
    };

    if let Err(e) = validate_url(&url) {
        tracing::warn!(url = %url, error = %e, "Skipping invalid feed URL");
        return Ok(None);
    }

    let name = title
        .filter(|t| !t.is_empty())
        .or(text.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| url.clone());
    let feed_type = outline_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_OUTLINE_TYPE.to_string());

    Ok(Some(Feed::new(name, url, feed_type)))
}
