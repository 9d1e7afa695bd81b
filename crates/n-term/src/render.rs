// SPDX-License-Identifier: MIT
//
// Render instructions and the sinks that consume them.
//
// Views never write escape sequences themselves. They describe a redraw as
// a short list of `Instruction`s in *view coordinates* (row 0, col 0 is the
// view's top-left corner) and push them into a `RenderSink`. The sink
// decides what that means:
//
//   Vec<Instruction> — records the instructions verbatim. Tests assert on
//   exactly what a command asked to redraw.
//
//   AnsiSink — translates to ANSI bytes at the view's screen origin,
//   tracking cursor and style so the bytes on the wire stay minimal.

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::output::{OutputBuffer, StyleWriter};
use crate::style::Style;

// ─── Instruction ─────────────────────────────────────────────────────────────

/// One step of a redraw, in view coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Place the cursor at `(row, col)`.
    MoveTo { row: usize, col: usize },
    /// Write `text` at the cursor with `style`. The cursor advances by the
    /// text's display width.
    Write { text: String, style: Style },
    /// Hide the cursor while a redraw is in progress.
    HideCursor,
    /// Show the cursor again.
    ShowCursor,
    /// Set the current style without writing anything.
    SetStyle(Style),
}

/// Anything that can consume render instructions.
pub trait RenderSink {
    fn emit(&mut self, instruction: Instruction);

    /// Convenience for a positioned write.
    fn write_at(&mut self, row: usize, col: usize, text: String, style: Style) {
        self.emit(Instruction::MoveTo { row, col });
        self.emit(Instruction::Write { text, style });
    }
}

impl RenderSink for Vec<Instruction> {
    #[inline]
    fn emit(&mut self, instruction: Instruction) {
        self.push(instruction);
    }
}

// ─── AnsiSink ────────────────────────────────────────────────────────────────

/// Translates instructions into ANSI bytes for a view placed at a screen
/// origin.
///
/// Cursor moves on the row the cursor is already on use the relative CUF /
/// CUB forms when those are shorter than an absolute CUP. Any write that
/// reaches the right edge of the screen drops cursor tracking, since
/// terminals disagree on where the cursor sits after the last column.
#[derive(Debug)]
pub struct AnsiSink {
    out: OutputBuffer,
    style: StyleWriter,
    /// Screen column of view column 0.
    origin_col: u16,
    /// Screen row of view row 0.
    origin_row: u16,
    screen_width: u16,
    /// Known screen position of the terminal cursor, if any.
    cursor: Option<(u16, u16)>,
}

/// The classic BBS terminal width.
const DEFAULT_SCREEN_WIDTH: u16 = 80;

impl AnsiSink {
    /// A sink for a view whose top-left corner is at screen `(col, row)`.
    #[must_use]
    pub fn new(origin_col: u16, origin_row: u16) -> Self {
        Self {
            out: OutputBuffer::new(),
            style: StyleWriter::new(),
            origin_col,
            origin_row,
            screen_width: DEFAULT_SCREEN_WIDTH,
            cursor: None,
        }
    }

    /// Set the caller's screen width (defaults to 80).
    #[must_use]
    pub const fn with_screen_width(mut self, width: u16) -> Self {
        self.screen_width = width;
        self
    }

    /// Screen `(col, row)` of the view's top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> (u16, u16) {
        (self.origin_col, self.origin_row)
    }

    /// Direct access to the byte buffer for output that is not part of the
    /// view (screen chrome, status lines).
    ///
    /// Tracked cursor and style are forgotten, since the caller may move
    /// the cursor or change colors.
    pub fn raw(&mut self) -> &mut OutputBuffer {
        self.invalidate();
        &mut self.out
    }

    /// Forget tracked cursor and style.
    pub fn invalidate(&mut self) {
        self.cursor = None;
        self.style.invalidate();
    }

    /// The bytes accumulated so far.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Write accumulated bytes to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl std::io::Write) -> std::io::Result<()> {
        self.out.flush_to(w)
    }

    fn move_to(&mut self, row: usize, col: usize) {
        let x = to_screen(self.origin_col, col);
        let y = to_screen(self.origin_row, row);

        match self.cursor {
            Some((cx, cy)) if cy == y && cx == x => {}
            Some((cx, cy)) if cy == y && x > cx && x - cx < RELATIVE_LIMIT => {
                ansi::cursor_forward(&mut self.out, x - cx).ok();
            }
            Some((cx, cy)) if cy == y && cx > x && cx - x < RELATIVE_LIMIT => {
                ansi::cursor_back(&mut self.out, cx - x).ok();
            }
            _ => {
                ansi::cursor_to(&mut self.out, x, y).ok();
            }
        }
        self.cursor = Some((x, y));
    }

    fn write(&mut self, text: &str, style: Style) {
        self.style.apply(&mut self.out, style);

        let mut cols: u16 = 0;
        for ch in text.chars() {
            // Control characters would move the caller's cursor.
            let ch = if ch.is_control() { ' ' } else { ch };
            self.out.push_char(ch);
            let w = ch.width().unwrap_or(0);
            cols = cols.saturating_add(u16::try_from(w).unwrap_or(u16::MAX));
        }

        self.cursor = self.cursor.and_then(|(cx, cy)| {
            let nx = cx.saturating_add(cols);
            (nx < self.screen_width).then_some((nx, cy))
        });
    }
}

/// Relative moves shorter than this beat an absolute CUP, which costs at
/// least six bytes.
const RELATIVE_LIMIT: u16 = 100;

fn to_screen(origin: u16, offset: usize) -> u16 {
    origin.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
}

impl RenderSink for AnsiSink {
    fn emit(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::MoveTo { row, col } => self.move_to(row, col),
            Instruction::Write { text, style } => self.write(&text, style),
            Instruction::HideCursor => {
                ansi::cursor_hide(&mut self.out).ok();
            }
            Instruction::ShowCursor => {
                ansi::cursor_show(&mut self.out).ok();
            }
            Instruction::SetStyle(style) => self.style.apply(&mut self.out, style),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::color::CellColor;

    fn bytes(sink: &AnsiSink) -> String {
        String::from_utf8(sink.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn vec_sink_records_instructions() {
        let mut sink: Vec<Instruction> = Vec::new();
        sink.write_at(2, 3, "hi".into(), Style::PLAIN);
        assert_eq!(
            sink,
            [
                Instruction::MoveTo { row: 2, col: 3 },
                Instruction::Write {
                    text: "hi".into(),
                    style: Style::PLAIN
                },
            ]
        );
    }

    #[test]
    fn ansi_sink_applies_origin() {
        let mut sink = AnsiSink::new(1, 3);
        sink.emit(Instruction::MoveTo { row: 0, col: 0 });
        sink.emit(Instruction::MoveTo { row: 2, col: 5 });
        // First move is absolute; second changes row so it is absolute too.
        assert_eq!(bytes(&sink), "\x1b[4;2H\x1b[6;7H");
    }

    #[test]
    fn ansi_sink_relative_moves_on_same_row() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::MoveTo { row: 0, col: 10 });
        sink.emit(Instruction::MoveTo { row: 0, col: 12 });
        sink.emit(Instruction::MoveTo { row: 0, col: 11 });
        sink.emit(Instruction::MoveTo { row: 0, col: 11 });
        assert_eq!(bytes(&sink), "\x1b[1;11H\x1b[2C\x1b[D");
    }

    #[test]
    fn ansi_sink_tracks_cursor_through_writes() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::MoveTo { row: 0, col: 0 });
        sink.emit(Instruction::Write {
            text: "abc".into(),
            style: Style::PLAIN,
        });
        sink.emit(Instruction::MoveTo { row: 0, col: 3 });
        assert_eq!(bytes(&sink), "\x1b[1;1H\x1b[0mabc");
    }

    #[test]
    fn ansi_sink_forgets_cursor_at_right_edge() {
        let mut sink = AnsiSink::new(0, 0).with_screen_width(4);
        sink.emit(Instruction::MoveTo { row: 0, col: 0 });
        sink.emit(Instruction::Write {
            text: "abcd".into(),
            style: Style::PLAIN,
        });
        sink.emit(Instruction::MoveTo { row: 0, col: 3 });
        assert_eq!(bytes(&sink), "\x1b[1;1H\x1b[0mabcd\x1b[1;4H");
    }

    #[test]
    fn ansi_sink_skips_redundant_style() {
        let style = Style::fg(CellColor::CYAN);
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::SetStyle(style));
        sink.emit(Instruction::Write {
            text: "a".into(),
            style,
        });
        assert_eq!(bytes(&sink), "\x1b[0m\x1b[36ma");
    }

    #[test]
    fn ansi_sink_blanks_control_chars() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::Write {
            text: "a\tb".into(),
            style: Style::PLAIN,
        });
        assert_eq!(bytes(&sink), "\x1b[0ma b");
    }

    #[test]
    fn ansi_sink_cursor_visibility() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::HideCursor);
        sink.emit(Instruction::ShowCursor);
        assert_eq!(bytes(&sink), "\x1b[?25l\x1b[?25h");
    }

    #[test]
    fn raw_access_invalidates_tracking() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::MoveTo { row: 0, col: 0 });
        sink.raw().push_str("X");
        sink.emit(Instruction::MoveTo { row: 0, col: 1 });
        assert_eq!(bytes(&sink), "\x1b[1;1HX\x1b[1;2H");
    }

    #[test]
    fn flush_drains_buffer() {
        let mut sink = AnsiSink::new(0, 0);
        sink.emit(Instruction::ShowCursor);
        let mut wire = Vec::new();
        sink.flush_to(&mut wire).unwrap();
        assert_eq!(wire, b"\x1b[?25h");
        assert!(sink.as_bytes().is_empty());
    }
}
