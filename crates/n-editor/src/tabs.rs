//! Tab stops and tab runs.
//!
//! The document never stores a logical tab as a single `'\t'`. A tab is
//! expanded into a *tab run*: as many `'\t'` cells as it takes to reach the
//! next tab stop from the column the tab starts at. Each cell is one screen
//! column, so column arithmetic stays trivial everywhere else, and the
//! cursor can tell it is "in tab space" by looking at the char under it.
//!
//! [`collapse_tabs`] turns runs back into literal tabs when text leaves the
//! editor or is about to be re-wrapped.

use std::iter::Peekable;
use std::str::Chars;

// ---------------------------------------------------------------------------
// TabStops
// ---------------------------------------------------------------------------

/// The tab-stop table for a given width and tab size.
///
/// Stops are `0, tab_size, 2·tab_size, …` up to and including `width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStops {
    stops: Vec<usize>,
    tab_size: usize,
    width: usize,
}

impl TabStops {
    /// Build the table. Both arguments must be non-zero; the editor
    /// validates them before they get here.
    #[must_use]
    pub fn new(width: usize, tab_size: usize) -> Self {
        debug_assert!(width > 0 && tab_size > 0, "tab stops need a positive width and size");
        let tab_size = tab_size.max(1);
        Self {
            stops: (0..=width).step_by(tab_size).collect(),
            tab_size,
            width,
        }
    }

    /// The stop columns, ascending.
    #[inline]
    #[must_use]
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    #[inline]
    #[must_use]
    pub const fn tab_size(&self) -> usize {
        self.tab_size
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Smallest stop strictly greater than `col`.
    ///
    /// Past the last stop this is the next multiple of the tab size,
    /// clamped to the width.
    #[must_use]
    pub fn next_stop(&self, col: usize) -> usize {
        self.stops
            .iter()
            .copied()
            .find(|&stop| stop > col)
            .unwrap_or_else(|| ((col / self.tab_size + 1) * self.tab_size).min(self.width))
    }

    /// Largest stop less than or equal to `col`.
    #[must_use]
    pub fn prev_stop(&self, col: usize) -> usize {
        self.stops
            .iter()
            .rev()
            .copied()
            .find(|&stop| stop <= col)
            .unwrap_or(0)
    }

    /// Columns a tab starting at `col` occupies.
    #[inline]
    #[must_use]
    pub const fn remaining_width(&self, col: usize) -> usize {
        self.tab_size - (col % self.tab_size)
    }

    /// The stop closest to `col`. Ties go to the left.
    #[must_use]
    pub fn nearest_stop(&self, col: usize) -> usize {
        let prev = self.prev_stop(col);
        let next = self.next_stop(col);
        if next > col && next - col < col - prev {
            next
        } else {
            prev
        }
    }
}

// ---------------------------------------------------------------------------
// Tab runs
// ---------------------------------------------------------------------------

/// The bounds `[start, end)` of the contiguous `'\t'` cells around `col`.
///
/// `col` itself must be a tab cell; otherwise the empty range `col..col` is
/// returned.
#[must_use]
pub fn run_bounds(chars: &[char], col: usize) -> (usize, usize) {
    if chars.get(col) != Some(&'\t') {
        return (col, col);
    }
    let start = chars[..col]
        .iter()
        .rposition(|&c| c != '\t')
        .map_or(0, |i| i + 1);
    let end = chars[col..]
        .iter()
        .position(|&c| c != '\t')
        .map_or(chars.len(), |i| col + i);
    (start, end)
}

/// Collapse every run of `n` tab cells into `ceil(n / tab_size)` literal
/// tabs.
///
/// This is the inverse of expansion for runs produced by the wrapper: every
/// logical tab but the first in a run starts on a stop, so the count is
/// exact whenever `tab_size <= width`.
#[must_use]
pub fn collapse_tabs(text: &str, tab_size: usize) -> String {
    collapse_tabs_mapped(text, tab_size).0
}

/// [`collapse_tabs`], also returning where every offset of `text` (in
/// chars, `0..=len`) lands in the collapsed output.
///
/// An offset inside a run lands after the literal tab whose cells it falls
/// in; an offset at the very start of a run stays before it.
#[must_use]
pub fn collapse_tabs_mapped(text: &str, tab_size: usize) -> (String, Vec<usize>) {
    let tab_size = tab_size.max(1);
    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len() + 1);
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        let dst = out.chars().count();
        if c != '\t' {
            map.push(dst);
            out.push(c);
            chars.next();
            continue;
        }

        let n = take_run(&mut chars);
        let m = n.div_ceil(tab_size);
        map.extend((0..n).map(|k| dst + offset_in_run(k, n, m, tab_size)));
        out.extend(std::iter::repeat_n('\t', m));
    }
    map.push(out.chars().count());

    (out, map)
}

fn take_run(chars: &mut Peekable<Chars<'_>>) -> usize {
    let mut n = 0;
    while chars.next_if_eq(&'\t').is_some() {
        n += 1;
    }
    n
}

/// Collapsed offset of cell `k` within a run of `n` cells that collapses
/// to `m` tabs. Only the first tab can be short, so it owns
/// `n - tab_size * (m - 1)` cells and the rest own `tab_size` each.
fn offset_in_run(k: usize, n: usize, m: usize, tab_size: usize) -> usize {
    if k == 0 {
        return 0;
    }
    let first = n - tab_size * (m - 1);
    if k <= first {
        1
    } else {
        1 + (k - first).div_ceil(tab_size)
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

    // -- TabStops -----------------------------------------------------------

    #[test]
    fn stops_up_to_width() {
        assert_eq!(TabStops::new(10, 4).stops(), [0, 4, 8]);
        assert_eq!(TabStops::new(8, 4).stops(), [0, 4, 8]);
        assert_eq!(TabStops::new(3, 4).stops(), [0]);
    }

    #[test]
    fn next_stop() {
        let t = TabStops::new(10, 4);
        assert_eq!(t.next_stop(0), 4);
        assert_eq!(t.next_stop(3), 4);
        assert_eq!(t.next_stop(4), 8);
        // Past the table: next multiple, clamped to width.
        assert_eq!(t.next_stop(8), 10);
        assert_eq!(t.next_stop(9), 10);
    }

    #[test]
    fn next_stop_wide_tab() {
        let t = TabStops::new(3, 4);
        assert_eq!(t.next_stop(0), 3);
    }

    #[test]
    fn prev_stop() {
        let t = TabStops::new(10, 4);
        assert_eq!(t.prev_stop(0), 0);
        assert_eq!(t.prev_stop(3), 0);
        assert_eq!(t.prev_stop(4), 4);
        assert_eq!(t.prev_stop(9), 8);
    }

    #[test]
    fn remaining_width() {
        let t = TabStops::new(80, 8);
        assert_eq!(t.remaining_width(0), 8);
        assert_eq!(t.remaining_width(3), 5);
        assert_eq!(t.remaining_width(7), 1);
        assert_eq!(t.remaining_width(8), 8);
    }

    #[test]
    fn nearest_stop_ties_go_left() {
        let t = TabStops::new(20, 4);
        assert_eq!(t.nearest_stop(1), 0);
        assert_eq!(t.nearest_stop(2), 0);
        assert_eq!(t.nearest_stop(3), 4);
        assert_eq!(t.nearest_stop(4), 4);
        assert_eq!(t.nearest_stop(6), 4);
    }

    // -- Runs ---------------------------------------------------------------

    #[test]
    fn run_bounds_finds_contiguous_cells() {
        let chars: Vec<char> = "a\t\t\tb\t".chars().collect();
        assert_eq!(run_bounds(&chars, 1), (1, 4));
        assert_eq!(run_bounds(&chars, 3), (1, 4));
        assert_eq!(run_bounds(&chars, 5), (5, 6));
        assert_eq!(run_bounds(&chars, 0), (0, 0));
        assert_eq!(run_bounds(&chars, 6), (6, 6));
    }

    // -- Collapse -----------------------------------------------------------

    #[test]
    fn collapse_aligned_runs() {
        assert_eq!(collapse_tabs("\t\t\t\tx", 4), "\tx");
        assert_eq!(collapse_tabs("\t\t\t\t\t\t\t\tx", 4), "\t\tx");
    }

    #[test]
    fn collapse_short_first_tab() {
        // "a" + tab to col 4 + tab to col 8.
        assert_eq!(collapse_tabs("a\t\t\t\t\t\t\tb", 4), "a\t\tb");
    }

    #[test]
    fn collapse_leaves_other_text() {
        assert_eq!(collapse_tabs("plain text", 4), "plain text");
        assert_eq!(collapse_tabs("", 4), "");
    }

    #[test]
    fn collapse_maps_offsets() {
        // a | 3 cells | 4 cells | b
        let (raw, map) = collapse_tabs_mapped("a\t\t\t\t\t\t\tb", 4);
        assert_eq!(raw, "a\t\tb");
        // Start of the run stays before the first tab; cells 1..=3 belong
        // to the first tab, cells 4..=7 to the second.
        assert_eq!(map, [0, 1, 2, 2, 2, 3, 3, 3, 3, 4]);
    }

    #[test]
    fn collapse_map_without_tabs_is_identity() {
        let (raw, map) = collapse_tabs_mapped("ab", 4);
        assert_eq!(raw, "ab");
        assert_eq!(map, [0, 1, 2]);
    }

    proptest! {
        #[test]
        fn collapse_map_is_monotonic(text in "[ab\t]{0,40}", tab_size in 1usize..9) {
            let (raw, map) = collapse_tabs_mapped(&text, tab_size);
            prop_assert_eq!(map.len(), text.chars().count() + 1);
            prop_assert_eq!(map[0], 0);
            prop_assert_eq!(map[map.len() - 1], raw.chars().count());
            prop_assert!(map.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(raw.replace('\t', ""), text.replace('\t', ""));
        }
    }
}
