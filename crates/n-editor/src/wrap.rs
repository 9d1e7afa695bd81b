//! Word wrap.
//!
//! [`wrap`] lays one paragraph of raw text out into visual lines no wider
//! than the viewport. It is a pure function: the editor calls it after every
//! edit that can change a paragraph's shape and splices the result back into
//! the line store.
//!
//! # Layout rules
//!
//! - A *word* is a run of non-whitespace chars plus the spaces that follow
//!   it. The trailing spaces hang past the right margin instead of forcing a
//!   wrap, so a line's width is measured without them
//!   ([`rendered_width`]). At most one space hangs: spaces fill the line up
//!   to column `width` and the rest of the run continues on the next line.
//! - A tab is its own token. Under [`TabPolicy::Expand`] it becomes a tab
//!   run reaching the next tab stop from the column it lands on; if that run
//!   does not fit it moves to the next line (at column 0 it is clamped to
//!   the width when the tab size exceeds it).
//! - A word wider than the viewport is hard-split into width-sized chunks,
//!   starting on a fresh line.
//!
//! Besides the lines, the result maps every raw char offset to the visual
//! position where that char landed, which is how the editor places the
//! cursor after a re-wrap.

use std::ops::Range;

use crate::lines::VisualLine;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How `'\t'` chars in the input are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPolicy {
    /// Each `'\t'` is one logical tab, expanded into a tab run.
    Expand,
    /// `'\t'` cells are already expanded; keep them verbatim.
    PreserveLiteral,
}

/// Which side of a line break an offset resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// End of the previous line.
    Upstream,
    /// Start of the next line.
    Downstream,
}

/// The output of [`wrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapResult {
    /// The visual lines. Only the last one ends the paragraph.
    pub lines: Vec<VisualLine>,
    /// Raw char range that landed on the second visual line, if any.
    pub first_wrap_range: Option<Range<usize>>,
    /// `(line, col)` of each raw char offset, plus one entry for the end.
    positions: Vec<Position>,
}

impl WrapResult {
    /// Where raw char `offset` landed, relative to the paragraph's first
    /// line. Offsets past the end resolve to the end.
    #[must_use]
    pub fn position_of(&self, offset: usize, bias: Bias) -> Position {
        let pos = self.positions[offset.min(self.positions.len() - 1)];
        match bias {
            Bias::Upstream if pos.col == 0 && pos.line > 0 && offset > 0 => {
                let prev = pos.line - 1;
                Position::new(prev, self.lines[prev].len())
            }
            _ => pos,
        }
    }

    /// Just the line texts (handy in tests and logs).
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Columns a line occupies, not counting trailing spaces.
#[must_use]
pub fn rendered_width(text: &str) -> usize {
    text.trim_end_matches(is_space).chars().count()
}

/// Whitespace that separates words. Tabs are handled separately.
#[inline]
fn is_space(c: char) -> bool {
    c != '\t' && c.is_whitespace()
}

// ---------------------------------------------------------------------------
// wrap
// ---------------------------------------------------------------------------

/// Lay `raw` out into lines of at most `width` rendered columns.
///
/// `raw` is a single paragraph: it must not contain line breaks. Zero
/// `width` or `tab_size` are treated as 1.
#[must_use]
pub fn wrap(raw: &str, width: usize, tab_size: usize, policy: TabPolicy) -> WrapResult {
    let chars: Vec<char> = raw.chars().collect();
    let mut layout = Layout::new(width.max(1), tab_size.max(1), chars.len());

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\t' {
            let end = match policy {
                TabPolicy::Expand => {
                    layout.place_tab(i);
                    i + 1
                }
                TabPolicy::PreserveLiteral => {
                    let end = chars[i..]
                        .iter()
                        .position(|&c| c != '\t')
                        .map_or(chars.len(), |n| i + n);
                    layout.place_run(i, end - i);
                    end
                }
            };
            i = end;
            continue;
        }

        let visible_end = chars[i..]
            .iter()
            .position(|&c| c == '\t' || is_space(c))
            .map_or(chars.len(), |n| i + n);
        let end = chars[visible_end..]
            .iter()
            .position(|&c| !is_space(c))
            .map_or(chars.len(), |n| visible_end + n);
        layout.place_word(&chars[i..end], i, visible_end - i);
        i = end;
    }

    layout.finish()
}

/// Mutable state while laying out one paragraph.
struct Layout {
    width: usize,
    tab_size: usize,
    raw_len: usize,
    lines: Vec<String>,
    current: String,
    /// Columns used on the current line, hanging spaces included.
    cols: usize,
    /// Raw offset of the first char of each line after the first.
    breaks: Vec<usize>,
    positions: Vec<Position>,
}

impl Layout {
    fn new(width: usize, tab_size: usize, raw_len: usize) -> Self {
        Self {
            width,
            tab_size,
            raw_len,
            lines: Vec::new(),
            current: String::new(),
            cols: 0,
            breaks: Vec::new(),
            positions: Vec::with_capacity(raw_len + 1),
        }
    }

    fn line_index(&self) -> usize {
        self.lines.len()
    }

    /// Append one cell. `raw` is the raw offset it starts, if any.
    fn push(&mut self, c: char, raw: Option<usize>) {
        if raw.is_some() {
            self.positions.push(Position::new(self.line_index(), self.cols));
        }
        self.current.push(c);
        self.cols += 1;
    }

    /// Start a new line whose first char is raw offset `next_raw`.
    fn break_line(&mut self, next_raw: usize) {
        self.lines.push(std::mem::take(&mut self.current));
        self.cols = 0;
        self.breaks.push(next_raw);
    }

    fn place_word(&mut self, word: &[char], start: usize, visible: usize) {
        if self.cols + visible <= self.width {
            self.push_chars(&word[..visible], start);
        } else {
            if self.cols > 0 {
                self.break_line(start);
            }
            // Hard split: full-width chunks, then the remainder.
            let mut k = 0;
            while visible - k > self.width {
                self.push_chars(&word[k..k + self.width], start + k);
                k += self.width;
                self.break_line(start + k);
            }
            self.push_chars(&word[k..visible], start + k);
        }
        self.hang_spaces(&word[visible..], start + visible);
    }

    /// Trailing spaces may reach column `width`, one past the margin. The
    /// rest of the run wraps like any other text.
    fn hang_spaces(&mut self, spaces: &[char], start: usize) {
        for (j, &c) in spaces.iter().enumerate() {
            if self.cols > self.width {
                self.break_line(start + j);
            }
            self.push(c, Some(start + j));
        }
    }

    fn push_chars(&mut self, chars: &[char], start: usize) {
        for (j, &c) in chars.iter().enumerate() {
            self.push(c, Some(start + j));
        }
    }

    /// Expand one logical tab at raw offset `raw`.
    fn place_tab(&mut self, raw: usize) {
        let mut n = self.remaining_width();
        if self.cols + n > self.width {
            if self.cols > 0 {
                self.break_line(raw);
            }
            n = self.tab_size.min(self.width);
        }
        self.push('\t', Some(raw));
        for _ in 1..n {
            self.push('\t', None);
        }
    }

    /// Lay out `n` already-expanded tab cells starting at raw offset `raw`,
    /// breaking only where an expanded tab could have broken.
    fn place_run(&mut self, raw: usize, n: usize) {
        let mut k = 0;
        while k < n {
            let mut chunk = self.remaining_width().min(n - k);
            if self.cols + chunk > self.width {
                if self.cols > 0 {
                    self.break_line(raw + k);
                }
                chunk = self.tab_size.min(self.width).min(n - k);
            }
            for j in 0..chunk {
                self.push('\t', Some(raw + k + j));
            }
            k += chunk;
        }
    }

    const fn remaining_width(&self) -> usize {
        self.tab_size - (self.cols % self.tab_size)
    }

    fn finish(mut self) -> WrapResult {
        self.positions.push(Position::new(self.line_index(), self.cols));
        self.lines.push(self.current);
        debug_assert_eq!(self.positions.len(), self.raw_len + 1);

        let first_wrap_range = self
            .breaks
            .first()
            .map(|&start| start..self.breaks.get(1).copied().unwrap_or(self.raw_len));

        let last = self.lines.len() - 1;
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| VisualLine::new(text, i == last))
            .collect();

        WrapResult {
            lines,
            first_wrap_range,
            positions: self.positions,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn texts(raw: &str, width: usize) -> Vec<String> {
        wrap(raw, width, 4, TabPolicy::Expand)
            .texts()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    // -- Basics -------------------------------------------------------------

    #[test]
    fn empty_input_is_one_empty_line() {
        let r = wrap("", 10, 4, TabPolicy::Expand);
        assert_eq!(r.lines, [VisualLine::new("", true)]);
        assert_eq!(r.first_wrap_range, None);
        assert_eq!(r.position_of(0, Bias::Downstream), Position::ZERO);
    }

    #[test]
    fn fits_on_one_line() {
        assert_eq!(texts("helloworld", 10), ["helloworld"]);
    }

    #[test]
    fn long_word_is_hard_split() {
        assert_eq!(texts("helloworld", 9), ["helloworl", "d"]);
        assert_eq!(texts("abcdefghij", 3), ["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn long_word_starts_on_fresh_line() {
        assert_eq!(texts("ab cdefghijklm", 5), ["ab ", "cdefg", "hijkl", "m"]);
    }

    #[test]
    fn trailing_spaces_hang() {
        let r = wrap("one two three", 7, 4, TabPolicy::Expand);
        assert_eq!(r.texts(), ["one two ", "three"]);
        assert_eq!(r.first_wrap_range, Some(8..13));
        assert_eq!(rendered_width(&r.lines[0].text), 7);
    }

    #[test]
    fn long_space_run_wraps() {
        assert_eq!(texts("one   two", 4), ["one  ", " two"]);

        let raw = format!("a{}", " ".repeat(30));
        let r = wrap(&raw, 10, 4, TabPolicy::Expand);
        let lens: Vec<usize> = r.lines.iter().map(VisualLine::len).collect();
        assert_eq!(lens, [11, 11, 9]);
        assert_eq!(r.first_wrap_range, Some(11..22));
        assert_eq!(r.position_of(31, Bias::Downstream), Position::new(2, 9));
    }

    #[test]
    fn first_wrap_range_stops_at_third_line() {
        let r = wrap("aa bb cc", 2, 4, TabPolicy::Expand);
        assert_eq!(r.texts(), ["aa ", "bb ", "cc"]);
        assert_eq!(r.first_wrap_range, Some(3..6));
    }

    #[test]
    fn only_last_line_ends_paragraph() {
        let r = wrap("aa bb cc", 2, 4, TabPolicy::Expand);
        let ends: Vec<bool> = r.lines.iter().map(|l| l.is_paragraph_end).collect();
        assert_eq!(ends, [false, false, true]);
    }

    #[test]
    fn leading_spaces_stay_put() {
        assert_eq!(texts("   x", 10), ["   x"]);
    }

    // -- Tabs ---------------------------------------------------------------

    #[test]
    fn tab_expands_to_next_stop() {
        assert_eq!(texts("a\tb", 10), ["a\t\t\tb"]);
        assert_eq!(texts("\tb", 10), ["\t\t\t\tb"]);
    }

    #[test]
    fn tab_that_does_not_fit_moves_down() {
        // Col 9 needs 3 cells to reach 12 > 10.
        assert_eq!(texts("abcdefghi\tx", 10), ["abcdefghi", "\t\t\t\tx"]);
    }

    #[test]
    fn wide_tab_is_clamped_at_column_zero() {
        let r = wrap("\tx", 3, 4, TabPolicy::Expand);
        assert_eq!(r.texts(), ["\t\t\t", "x"]);
    }

    #[test]
    fn preserve_literal_keeps_runs() {
        let r = wrap("a\t\t\tb", 10, 4, TabPolicy::PreserveLiteral);
        assert_eq!(r.texts(), ["a\t\t\tb"]);
    }

    #[test]
    fn preserve_literal_breaks_between_tabs() {
        // "xxxx" + two expanded tabs, where the second wrapped.
        let expanded = wrap("xxxx\t\t", 10, 4, TabPolicy::Expand);
        assert_eq!(expanded.texts(), ["xxxx\t\t\t\t", "\t\t\t\t"]);
        let joined = expanded.texts().concat();
        let again = wrap(&joined, 10, 4, TabPolicy::PreserveLiteral);
        assert_eq!(again.lines, expanded.lines);
    }

    // -- Positions ----------------------------------------------------------

    #[test]
    fn positions_follow_chars() {
        let r = wrap("one two three", 7, 4, TabPolicy::Expand);
        assert_eq!(r.position_of(0, Bias::Downstream), Position::new(0, 0));
        assert_eq!(r.position_of(4, Bias::Downstream), Position::new(0, 4));
        assert_eq!(r.position_of(10, Bias::Downstream), Position::new(1, 2));
        assert_eq!(r.position_of(13, Bias::Downstream), Position::new(1, 5));
        assert_eq!(r.position_of(99, Bias::Downstream), Position::new(1, 5));
    }

    #[test]
    fn bias_at_line_boundary() {
        let r = wrap("one two three", 7, 4, TabPolicy::Expand);
        assert_eq!(r.position_of(8, Bias::Downstream), Position::new(1, 0));
        assert_eq!(r.position_of(8, Bias::Upstream), Position::new(0, 8));
        // Away from a boundary the bias does not matter.
        assert_eq!(r.position_of(9, Bias::Upstream), Position::new(1, 1));
    }

    #[test]
    fn expanded_tab_maps_to_run_start() {
        let r = wrap("a\tb", 10, 4, TabPolicy::Expand);
        assert_eq!(r.position_of(1, Bias::Downstream), Position::new(0, 1));
        assert_eq!(r.position_of(2, Bias::Downstream), Position::new(0, 4));
        assert_eq!(r.position_of(3, Bias::Downstream), Position::new(0, 5));
    }

    // -- Properties ---------------------------------------------------------

    fn paragraph() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                4 => "[a-z]{1,12}",
                2 => Just(" ".to_owned()),
                1 => Just("  ".to_owned()),
                1 => Just("\t".to_owned()),
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn every_line_fits(raw in paragraph(), width in 1usize..40, ts in 1usize..9) {
            prop_assume!(ts <= width);
            let r = wrap(&raw, width, ts, TabPolicy::Expand);
            for line in &r.lines {
                prop_assert!(rendered_width(&line.text) <= width, "{:?}", line.text);
                prop_assert!(line.len() <= width + 1, "{:?}", line.text);
            }
        }

        #[test]
        fn rewrap_is_idempotent(raw in paragraph(), width in 1usize..40, ts in 1usize..9) {
            prop_assume!(ts <= width);
            let first = wrap(&raw, width, ts, TabPolicy::Expand);
            let joined = first.texts().concat();
            let again = wrap(&joined, width, ts, TabPolicy::PreserveLiteral);
            prop_assert_eq!(again.lines, first.lines);
        }

        #[test]
        fn non_tab_text_is_preserved(raw in "[a-z ]{0,60}", width in 1usize..30) {
            let r = wrap(&raw, width, 4, TabPolicy::Expand);
            prop_assert_eq!(r.texts().concat(), raw);
        }

        #[test]
        fn positions_are_monotonic(raw in paragraph(), width in 1usize..40) {
            let r = wrap(&raw, width, 4, TabPolicy::Expand);
            let len = raw.chars().count();
            for i in 0..len {
                prop_assert!(
                    r.position_of(i, Bias::Downstream) < r.position_of(i + 1, Bias::Downstream)
                );
            }
        }
    }
}
