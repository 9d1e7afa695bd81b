//! Line store — the document as an ordered list of visual lines.
//!
//! A paragraph (one "real" line of the user's text) occupies one or more
//! consecutive visual lines; the last of them carries the paragraph-end
//! marker. The store upholds three invariants no matter which mutator runs:
//!
//! - there is always at least one line,
//! - the last line always ends a paragraph,
//! - the line count changes only through [`LineStore::replace_range`],
//!   [`LineStore::delete_line`] and [`LineStore::reset`].

// ---------------------------------------------------------------------------
// VisualLine
// ---------------------------------------------------------------------------

/// One physical row of the wrapped document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisualLine {
    /// Row text. Tab runs are stored as `'\t'` cells.
    pub text: String,
    /// Whether this row ends its paragraph.
    pub is_paragraph_end: bool,
}

impl VisualLine {
    #[must_use]
    pub fn new(text: impl Into<String>, is_paragraph_end: bool) -> Self {
        Self {
            text: text.into(),
            is_paragraph_end,
        }
    }

    /// An empty row that ends its paragraph.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            text: String::new(),
            is_paragraph_end: true,
        }
    }

    /// Length in chars (= screen columns).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The char at `col`, if any.
    #[inline]
    #[must_use]
    pub fn char_at(&self, col: usize) -> Option<char> {
        self.text.chars().nth(col)
    }

    /// The row's chars, for column arithmetic.
    #[must_use]
    pub fn chars(&self) -> Vec<char> {
        self.text.chars().collect()
    }
}

// ---------------------------------------------------------------------------
// LineStore
// ---------------------------------------------------------------------------

/// The ordered visual lines of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<VisualLine>,
}

impl LineStore {
    /// A store holding a single empty paragraph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![VisualLine::empty()],
        }
    }

    /// Build a store from already-wrapped lines.
    #[must_use]
    pub fn from_lines(lines: Vec<VisualLine>) -> Self {
        let mut store = Self { lines };
        store.normalize();
        store
    }

    /// Replace the whole document.
    pub fn reset(&mut self, lines: Vec<VisualLine>) {
        self.lines = lines;
        self.normalize();
    }

    /// Number of visual lines (always at least 1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the document holds no text at all: a single empty line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    /// The line at `i`. Out-of-range indices are clamped to the last line.
    #[must_use]
    pub fn line(&self, i: usize) -> &VisualLine {
        &self.lines[i.min(self.last_index())]
    }

    /// Length of line `i` in columns.
    #[must_use]
    pub fn line_len(&self, i: usize) -> usize {
        self.line(i).len()
    }

    /// All lines.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[VisualLine] {
        &self.lines
    }

    /// Index of the paragraph-terminating line at or after `i`.
    #[must_use]
    pub fn find_next_paragraph_end(&self, i: usize) -> usize {
        let i = i.min(self.last_index());
        self.lines[i..]
            .iter()
            .position(|l| l.is_paragraph_end)
            .map_or(self.last_index(), |off| i + off)
    }

    /// Index of the first line of the paragraph containing `i`.
    #[must_use]
    pub fn find_paragraph_start(&self, i: usize) -> usize {
        let i = i.min(self.last_index());
        self.lines[..i]
            .iter()
            .rposition(|l| l.is_paragraph_end)
            .map_or(0, |p| p + 1)
    }

    /// `(first, last)` line indices of the paragraph containing `i`.
    #[must_use]
    pub fn paragraph_bounds(&self, i: usize) -> (usize, usize) {
        (self.find_paragraph_start(i), self.find_next_paragraph_end(i))
    }

    /// Text of lines `start..=end` concatenated. With `include_eol`, a
    /// `'\n'` follows every paragraph-terminating line except the last one
    /// emitted.
    #[must_use]
    pub fn contiguous_text(&self, start: usize, end: usize, include_eol: bool) -> String {
        let end = end.min(self.last_index());
        let mut out = String::new();
        for (i, line) in self.lines[start..=end].iter().enumerate() {
            out.push_str(&line.text);
            if include_eol && line.is_paragraph_end && start + i != end {
                out.push('\n');
            }
        }
        out
    }

    /// Iterate over paragraphs as `(first, last)` line index pairs.
    pub fn paragraphs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut start = 0;
        self.lines.iter().enumerate().filter_map(move |(i, line)| {
            line.is_paragraph_end.then(|| {
                let range = (start, i);
                start = i + 1;
                range
            })
        })
    }

    // -- Mutators -----------------------------------------------------------

    /// Replace lines `start..=end` with `new_lines` in one splice.
    ///
    /// `new_lines` must not be empty; use [`delete_line`](Self::delete_line)
    /// to remove rows.
    pub fn replace_range(&mut self, start: usize, end: usize, new_lines: Vec<VisualLine>) {
        debug_assert!(!new_lines.is_empty(), "replace_range needs at least one line");
        debug_assert!(start <= end && end < self.lines.len(), "replace_range out of bounds");
        let end = end.min(self.last_index());
        self.lines.splice(start..=end, new_lines);
        self.normalize();
    }

    /// Remove the single visual line `i`.
    ///
    /// If it ended a paragraph, the marker moves to the line that takes its
    /// place. Deleting the only line leaves one empty line.
    pub fn delete_line(&mut self, i: usize) {
        if i >= self.lines.len() {
            return;
        }
        let removed = self.lines.remove(i);
        if removed.is_paragraph_end {
            if let Some(next) = self.lines.get_mut(i) {
                next.is_paragraph_end = true;
            }
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(VisualLine::empty());
        }
        if let Some(last) = self.lines.last_mut() {
            last.is_paragraph_end = true;
        }
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Two paragraphs: "aaa bbb " + "cc" and "dd".
    fn sample() -> LineStore {
        LineStore::from_lines(vec![
            VisualLine::new("aaa bbb ", false),
            VisualLine::new("cc", true),
            VisualLine::new("dd", true),
        ])
    }

    #[test]
    fn new_store_has_one_empty_line() {
        let store = LineStore::new();
        assert_eq!(store.len(), 1);
        assert!(store.is_empty());
        assert!(store.line(0).is_paragraph_end);
    }

    #[test]
    fn from_lines_terminates_last_line() {
        let store = LineStore::from_lines(vec![VisualLine::new("x", false)]);
        assert!(store.line(0).is_paragraph_end);
        let store = LineStore::from_lines(Vec::new());
        assert_eq!(store.lines(), [VisualLine::empty()]);
    }

    #[test]
    fn paragraph_lookups() {
        let store = sample();
        assert_eq!(store.find_next_paragraph_end(0), 1);
        assert_eq!(store.find_next_paragraph_end(1), 1);
        assert_eq!(store.find_next_paragraph_end(2), 2);
        assert_eq!(store.find_paragraph_start(1), 0);
        assert_eq!(store.find_paragraph_start(2), 2);
        assert_eq!(store.paragraph_bounds(0), (0, 1));
    }

    #[test]
    fn paragraphs_iterator() {
        let store = sample();
        assert_eq!(store.paragraphs().collect::<Vec<_>>(), [(0, 1), (2, 2)]);
    }

    #[test]
    fn contiguous_text_with_and_without_eol() {
        let store = sample();
        assert_eq!(store.contiguous_text(0, 2, true), "aaa bbb cc\ndd");
        assert_eq!(store.contiguous_text(0, 2, false), "aaa bbb ccdd");
        assert_eq!(store.contiguous_text(0, 1, true), "aaa bbb cc");
    }

    #[test]
    fn replace_range_splices() {
        let mut store = sample();
        store.replace_range(0, 1, vec![VisualLine::new("joined", true)]);
        assert_eq!(
            store.lines(),
            [VisualLine::new("joined", true), VisualLine::new("dd", true)]
        );
    }

    #[test]
    fn replace_range_keeps_last_line_terminated() {
        let mut store = sample();
        store.replace_range(2, 2, vec![VisualLine::new("d", false), VisualLine::new("d", false)]);
        assert!(store.line(store.last_index()).is_paragraph_end);
    }

    #[test]
    fn delete_line_propagates_marker() {
        let mut store = sample();
        store.delete_line(1);
        // "cc" ended the paragraph; "dd" already ends one.
        assert_eq!(store.len(), 2);

        let mut store = LineStore::from_lines(vec![
            VisualLine::new("a", true),
            VisualLine::new("b", false),
            VisualLine::new("c", true),
        ]);
        store.delete_line(0);
        assert_eq!(
            store.lines(),
            [VisualLine::new("b", true), VisualLine::new("c", true)]
        );
    }

    #[test]
    fn delete_only_line_leaves_empty_document() {
        let mut store = LineStore::from_lines(vec![VisualLine::new("only", true)]);
        store.delete_line(0);
        assert_eq!(store.lines(), [VisualLine::empty()]);
    }

    #[test]
    fn visual_line_helpers() {
        let line = VisualLine::new("a\t\tb", true);
        assert_eq!(line.len(), 4);
        assert_eq!(line.char_at(1), Some('\t'));
        assert_eq!(line.char_at(3), Some('b'));
        assert_eq!(line.char_at(4), None);
    }
}
