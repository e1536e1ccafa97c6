use std::borrow::Cow;
use std::io::{self, Write};

use super::dispatch::ResultReceiver;
use super::matcher::SearchResult;
use crate::util::{strip_control_chars, truncate_to_width};

/// Consumer of the result stream.
pub trait ResultSink {
    /// Handles one result. An error here does not stop the stream from
    /// being drained.
    fn accept(&mut self, result: SearchResult) -> io::Result<()>;

    /// Called once after the stream has closed.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects results in arrival order.
impl ResultSink for Vec<SearchResult> {
    fn accept(&mut self, result: SearchResult) -> io::Result<()> {
        self.push(result);
        Ok(())
    }
}

/// Renders results as text: the field name on one line, its content on the
/// next, then a blank line.
///
/// Text from feeds is stripped of terminal control sequences and, when
/// `max_content_width` is non-zero, truncated to that many columns.
pub struct TextSink<W: Write> {
    out: W,
    max_content_width: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            max_content_width: 0,
        }
    }

    pub fn with_max_content_width(mut self, width: usize) -> Self {
        self.max_content_width = width;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for TextSink<W> {
    fn accept(&mut self, result: SearchResult) -> io::Result<()> {
        let field = strip_control_chars(&result.field);
        let mut content = strip_control_chars(&result.content);
        if self.max_content_width > 0 {
            content = Cow::Owned(truncate_to_width(&content, self.max_content_width).into_owned());
        }
        write!(self.out, "{}:\n{}\n\n", field, content)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// What the sink saw once the stream closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplaySummary {
    /// Results accepted without error.
    pub rendered: usize,
}

/// Feeds every result from `results` into `sink` until the channel is
/// closed and empty.
///
/// Never stops early: after a sink error the remaining results are still
/// received (and discarded) so producers are not left blocked. The first
/// error is returned once the stream has ended.
pub async fn drain<S: ResultSink + ?Sized>(
    mut results: ResultReceiver,
    sink: &mut S,
) -> io::Result<DisplaySummary> {
    let mut summary = DisplaySummary::default();
    let mut first_error = None;

    while let Some(result) = results.recv().await {
        if first_error.is_some() {
            continue;
        }
        match sink.accept(result) {
            Ok(()) => summary.rendered += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to render result, discarding the rest");
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            sink.finish()?;
            Ok(summary)
        }
    }
}
