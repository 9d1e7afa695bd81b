//! Text coming into the editor from outside.
//!
//! Documents loaded with `set_document` or inserted programmatically may
//! come from anywhere: a message base, an uploaded file, a paste. Before any
//! of it reaches the wrapper it is split into paragraphs on every line-break
//! convention we know of, stripped of control chars (tabs excepted), and
//! cleaned of chars the single-width grid cannot show.

use std::sync::LazyLock;

use regex::Regex;
use unicode_width::UnicodeWidthChar;

/// Every line-break convention: CR LF, LF, VT, FF, CR, NEL, LS, PS.
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\n\x0B\x0C\r\u{85}\u{2028}\u{2029}]").expect("line break pattern is valid")
});

/// Stand-in for chars wider than one column.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Split `raw` into paragraphs and clean each one.
///
/// Always returns at least one paragraph (possibly empty). A trailing line
/// break yields a trailing empty paragraph, so `"a\n"` is two paragraphs.
#[must_use]
pub fn paragraphs(raw: &str) -> Vec<String> {
    LINE_BREAK.split(raw).map(sanitize).collect()
}

/// Remove control and zero-width chars (except tab) and replace wide chars
/// with [`REPLACEMENT`].
#[must_use]
pub fn sanitize(line: &str) -> String {
    line.chars()
        .filter_map(|c| match c {
            '\t' => Some('\t'),
            c if c.is_control() => None,
            c => match c.width() {
                Some(1) => Some(c),
                Some(0) | None => None,
                Some(_) => Some(REPLACEMENT),
            },
        })
        .collect()
}

/// Whether `c` can be typed into the document: a single-column, non-control
/// char.
#[inline]
#[must_use]
pub fn is_printable(c: char) -> bool {
    !c.is_control() && c.width() == Some(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_on_every_convention() {
        let raw = "a\r\nb\nc\rd\x0Be\x0Cf\u{85}g\u{2028}h\u{2029}i";
        assert_eq!(paragraphs(raw), ["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
    }

    #[test]
    fn crlf_is_one_break() {
        assert_eq!(paragraphs("a\r\n\r\nb"), ["a", "", "b"]);
    }

    #[test]
    fn empty_and_trailing_breaks() {
        assert_eq!(paragraphs(""), [""]);
        assert_eq!(paragraphs("a\n"), ["a", ""]);
    }

    #[test]
    fn sanitize_strips_controls_keeps_tabs() {
        assert_eq!(sanitize("a\x08b\x1b[0mc\td\x00"), "ab[0mc\td");
    }

    #[test]
    fn sanitize_strips_zero_width() {
        assert_eq!(sanitize("a\u{200B}b\u{0301}"), "ab");
    }

    #[test]
    fn sanitize_replaces_wide_chars() {
        assert_eq!(sanitize("a中b"), "a\u{FFFD}b");
    }

    #[test]
    fn printable() {
        assert!(is_printable('a'));
        assert!(is_printable(' '));
        assert!(is_printable('é'));
        assert!(!is_printable('\t'));
        assert!(!is_printable('\x7f'));
        assert!(!is_printable('中'));
        assert!(!is_printable('\u{200B}'));
    }
}
