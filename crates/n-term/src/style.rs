// SPDX-License-Identifier: MIT
//
// Style — the graphic rendition attached to text written to the terminal.
//
// A `Style` is foreground + background + attribute flags. It is what a
// render instruction carries alongside its text and what `ansi::sgr`
// encodes. Styles are `Copy` and compared by value so the output layer
// can skip re-emitting an SGR sequence the terminal already has.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters
    /// in the ANSI escape sequence standard. Combine with bitwise OR:
    ///
    /// ```
    /// use n_term::style::Attr;
    ///
    /// let style = Attr::BOLD | Attr::BLINK;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::INVERSE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity. On 16-color BBS terminals this is
        /// also how the bright foreground colors are reached.
        const BOLD      = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM       = 1 << 1;
        /// SGR 4 — underline.
        const UNDERLINE = 1 << 2;
        /// SGR 5 — blink.
        const BLINK     = 1 << 3;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 4;
        /// SGR 8 — invisible text.
        const HIDDEN    = 1 << 5;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background and attributes for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Terminal defaults: default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// A style with the given foreground and default everything else.
    #[inline]
    #[must_use]
    pub const fn fg(fg: CellColor) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Set the background color.
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    /// Set text attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Whether this style is the terminal default.
    #[inline]
    #[must_use]
    pub fn is_plain(self) -> bool {
        self == Self::PLAIN
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_default_is_empty() {
        assert!(Attr::default().is_empty());
    }

    #[test]
    fn attr_combine() {
        let a = Attr::BOLD | Attr::UNDERLINE;
        assert!(a.contains(Attr::BOLD));
        assert!(a.contains(Attr::UNDERLINE));
        assert!(!a.contains(Attr::DIM));
    }

    #[test]
    fn plain_style() {
        assert!(Style::default().is_plain());
        assert!(Style::PLAIN.is_plain());
        assert!(!Style::fg(CellColor::CYAN).is_plain());
    }

    #[test]
    fn builders_keep_other_fields() {
        let s = Style::fg(CellColor::WHITE)
            .with_bg(CellColor::BLUE)
            .with_attrs(Attr::BOLD);
        assert_eq!(s.fg, CellColor::WHITE);
        assert_eq!(s.bg, CellColor::BLUE);
        assert_eq!(s.attrs, Attr::BOLD);
    }
}
