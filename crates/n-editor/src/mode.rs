//! Insert / overtype editing mode.
//!
//! The editor is always in exactly one [`EditMode`]. The mode only changes
//! what character entry does; movement and deletion behave the same in both:
//!
//! | Mode      | Cursor shape | Character entry                      |
//! |-----------|--------------|--------------------------------------|
//! | Insert    | Bar          | splices the char in, re-wrapping      |
//! | Overtype  | Underline    | replaces the char under the cursor   |

use std::fmt;

use n_term::ansi::CursorShape;

// ---------------------------------------------------------------------------
// EditMode
// ---------------------------------------------------------------------------

/// The current editing mode. Key dispatch lives in the editor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditMode {
    /// Default mode. Typed characters push the rest of the line right.
    #[default]
    Insert,
    /// Typed characters replace the character under the cursor.
    Overtype,
}

impl EditMode {
    /// Human-readable name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Overtype => "OVERTYPE",
        }
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Insert => CursorShape::SteadyBar,
            Self::Overtype => CursorShape::SteadyUnderline,
        }
    }

    /// The other mode.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Insert => Self::Overtype,
            Self::Overtype => Self::Insert,
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
