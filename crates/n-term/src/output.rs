// SPDX-License-Identifier: MIT
//
// Output buffering and stateful style tracking.
//
// Two components work together to minimize what crosses the wire:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so an entire redraw
//   can be written to the socket in a single write() call. Over telnet every
//   partial write can become its own TCP segment; batching keeps a redraw
//   atomic from the caller's point of view.
//
//   StyleWriter — tracks the graphic rendition the remote terminal currently
//   has and skips redundant SGR sequences. If the last text was cyan on
//   blue and the next text is also cyan on blue, nothing is emitted.

use std::io::{self, Write};

use crate::ansi;
use crate::style::Style;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()`.
///
/// Default capacity: 4 KB — a full 80×24 repaint with colors fits without
/// reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 4096;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Append a string verbatim.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails. The buffer is left intact
    /// in that case.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── StyleWriter ─────────────────────────────────────────────────────────────

/// Stateful SGR emitter that remembers the terminal's current style.
///
/// # Optimization decisions
///
/// - **Unknown state** (first use, or after [`invalidate`](Self::invalidate)):
///   full `ansi::sgr` — reset, attributes, colors.
/// - **Attributes changed**: there is no portable way to turn off a single
///   attribute on old BBS clients, so reset and re-emit everything.
/// - **Only colors changed**: emit just the color that differs.
#[derive(Debug, Default)]
pub struct StyleWriter {
    last: Option<Style>,
}

impl StyleWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Forget the tracked style. Call after anything else wrote to the
    /// terminal (raw art, a screen clear, a reset).
    #[allow(clippy::missing_const_for_fn)]
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// The style the terminal is known to have, if any.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<Style> {
        self.last
    }

    /// Make the terminal's style equal to `style`, emitting as little as
    /// possible.
    pub fn apply(&mut self, out: &mut OutputBuffer, style: Style) {
        match self.last {
            Some(last) if last == style => {}
            Some(last) if last.attrs == style.attrs => {
                if last.fg != style.fg {
                    ansi::fg(out, style.fg).ok();
                }
                if last.bg != style.bg {
                    ansi::bg(out, style.bg).ok();
                }
            }
            _ => {
                ansi::sgr(out, style).ok();
            }
        }
        self.last = Some(style);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
