//! Cursor positions in the wrapped document.
//!
//! `line` indexes *visual* lines (wrapped rows), not paragraphs, and `col` is
//! a char offset into that row. Every stored char is one column wide, tab
//! cells included, so `col` is also the screen column. `col` may equal the
//! row's length: the slot after the last char, where typing appends.

use std::fmt;

/// (visual line, column), 0-indexed. Ordered line first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.col)
    }
}

/// `line:col`, 1-indexed, as a caller reads it on the status line.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_line_then_col() {
        assert!(Position::new(0, 80) < Position::new(1, 0));
        assert!(Position::new(3, 2) < Position::new(3, 3));
        assert_eq!(Position::default(), Position::ZERO);
    }

    #[test]
    fn formats() {
        assert_eq!(Position::new(2, 5).to_string(), "3:6");
        assert_eq!(format!("{:?}", Position::new(2, 5)), "(2, 5)");
    }
}
