//! Cursor and viewport.
//!
//! The editor shows `height` visual lines of the document starting at the
//! viewport's `top` line. The [`Cursor`] is kept *relative* to that window:
//! `row` is a screen row inside the viewport, so the document line under
//! the cursor is always `top + row`.
//!
//! # Sticky column
//!
//! When moving vertically, the cursor remembers the column it was at. If it
//! moves through a short line and then reaches a long line again, it snaps
//! back to the remembered column. Horizontal movement and edits reset the
//! sticky column.
//!
//! # Clamping
//!
//! Every mutation funnels the cursor through [`place`], which clamps the
//! target to the document and scrolls the viewport so the target is
//! visible. Nothing else writes `top` or `row`.

use crate::lines::LineStore;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible visual line.
    pub top: usize,
    /// Columns per row. Also the wrap width.
    pub width: usize,
    /// Visible rows.
    pub height: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            top: 0,
            width,
            height,
        }
    }

    /// One past the last visible line.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> usize {
        self.top + self.height
    }

    /// Whether document line `line` is on screen.
    #[inline]
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        line >= self.top && line < self.bottom()
    }

    /// Scroll the minimum amount that brings `line` on screen. Returns true
    /// if `top` changed.
    pub const fn scroll_to(&mut self, line: usize) -> bool {
        let old = self.top;
        if line < self.top {
            self.top = line;
        } else if line >= self.bottom() {
            self.top = line + 1 - self.height;
        }
        self.top != old
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// The text cursor, relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Screen row inside the viewport, `0..height`.
    pub row: usize,
    /// Column in the visual line, `0..=line_len`. May exceed the width when
    /// the line ends in hanging spaces.
    pub col: usize,
    /// Column vertical movement tries to return to.
    pub sticky_col: usize,
}

impl Cursor {
    /// The document line under the cursor.
    #[inline]
    #[must_use]
    pub const fn line(&self, viewport: &Viewport) -> usize {
        viewport.top + self.row
    }

    /// The cursor as a document position.
    #[inline]
    #[must_use]
    pub const fn position(&self, viewport: &Viewport) -> Position {
        Position::new(self.line(viewport), self.col)
    }

    /// The terminal column the cursor is drawn at. Hanging spaces past the
    /// right margin pin it to the margin.
    #[inline]
    #[must_use]
    pub fn screen_col(&self, viewport: &Viewport) -> usize {
        self.col.min(viewport.width)
    }
}

/// Move the cursor to `target`, clamped to the document, scrolling the
/// viewport as needed. Returns true if the viewport scrolled.
///
/// The sticky column is left alone; callers that move horizontally reset
/// it themselves.
pub fn place(
    cursor: &mut Cursor,
    viewport: &mut Viewport,
    lines: &LineStore,
    target: Position,
) -> bool {
    let line = target.line.min(lines.last_index());
    let col = target.col.min(lines.line_len(line));

    let old_top = viewport.top;
    // A shrinking document can leave `top` past the end.
    viewport.top = viewport.top.min(lines.last_index());
    viewport.scroll_to(line);

    cursor.row = line - viewport.top;
    cursor.col = col;
    viewport.top != old_top
}

/// Re-run [`place`] on the cursor's current position. Call after the line
/// store changed underneath the cursor.
pub fn clamp(cursor: &mut Cursor, viewport: &mut Viewport, lines: &LineStore) -> bool {
    let pos = cursor.position(viewport);
    place(cursor, viewport, lines, pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
