use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use unicode_width::UnicodeWidthChar;

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates `s` to at most `max_width` terminal columns, appending "..."
/// when text was cut.
///
/// Widths come from `unicode-width`, so CJK and emoji count as two columns.
/// At widths of 3 or less there is no room for an ellipsis and the text is
/// simply cut.
///
/// ```
/// use sift::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_width = |c: char| UnicodeWidthChar::width(c).unwrap_or(0);

    let mut width = 0;
    // Byte offset where the text must be cut to leave room for the ellipsis.
    let mut ellipsis_cut = None;
    // Byte offset of the longest prefix that fits in max_width.
    let mut hard_cut = None;

    for (idx, c) in s.char_indices() {
        let w = char_width(c);
        if ellipsis_cut.is_none() && width + w > max_width.saturating_sub(ELLIPSIS_WIDTH) {
            ellipsis_cut = Some(idx);
        }
        if width + w > max_width {
            hard_cut = Some(idx);
            break;
        }
        width += w;
    }

    let Some(hard_cut) = hard_cut else {
        return Cow::Borrowed(s);
    };

    if max_width <= ELLIPSIS_WIDTH {
        return Cow::Owned(s[..hard_cut].to_string());
    }

    let cut = ellipsis_cut.unwrap_or(hard_cut);
    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

fn is_stripped_control(c: char) -> bool {
    c == '\u{7f}' || (c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r'))
}

/// Removes terminal control characters and ANSI escape sequences
/// from feed-supplied text.
///
/// Strips CSI (`ESC [` … final byte) and OSC (`ESC ]` … BEL or `ESC \`)
/// sequences, bare ESC, DEL and C0 controls. Tab, newline and carriage
/// return are kept. Clean input is returned borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    skip_csi(&mut chars);
                }
                Some(']') => {
                    chars.next();
                    skip_osc(&mut chars);
                }
                _ => {}
            },
            c if is_stripped_control(c) => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Consumes CSI parameter bytes through the final byte (0x40..=0x7e).
fn skip_csi(chars: &mut Peekable<Chars<'_>>) {
    for c in chars.by_ref() {
        if ('\u{40}'..='\u{7e}').contains(&c) {
            break;
        }
    }
}

/// Consumes an OSC payload through its BEL or ST terminator.
fn skip_osc(chars: &mut Peekable<Chars<'_>>) {
    while let Some(c) = chars.next() {
        if c == '\u{07}' {
            break;
        }
        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
            chars.next();
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("Short", 10), Cow::Borrowed("Short")));
        assert!(matches!(truncate_to_width("Exact", 5), Cow::Borrowed("Exact")));
    }

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Hello World", 4), "H...");
    }

    #[test]
    fn test_cjk_truncation() {
        // Each CJK character is two columns wide.
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好世界", 8), "你好世界");
    }

    #[test]
    fn test_narrow_widths_cut_without_ellipsis() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        assert_eq!(truncate_to_width("你好", 1), "");
    }

    #[test]
    fn test_strip_clean_text_is_borrowed() {
        let text = "President signs new bill\twith tabs\nand newlines";
        assert!(matches!(strip_control_chars(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_csi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_control_chars("a\x1b[2Jb\x1b[10;20Hc"), "abc");
    }

    #[test]
    fn test_strip_osc_sequences() {
        assert_eq!(strip_control_chars("\x1b]0;title\x07text"), "text");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\text"), "text");
    }

    #[test]
    fn test_strip_bare_esc_and_controls() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
        assert_eq!(strip_control_chars("a\x00b\x08c\x7fd"), "abcd");
    }

    #[test]
    fn test_strip_preserves_unicode() {
        assert_eq!(strip_control_chars("日本\x1b[1m語\x1b[0m 🎉"), "日本語 🎉");
    }
}
