// SPDX-License-Identifier: MIT
//
// n-term — Terminal plumbing for n-bbs.
//
// Everything between a board view and the bytes on a caller's connection:
// ANSI encoding of cursor moves and colors, a decoder for the keys remote
// terminals send, an output buffer that batches a redraw into one write,
// and the render-instruction vocabulary views speak.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm). Callers are on the far end of a socket, not on a local tty,
// so there is no termios to drive; every byte sent is accounted for and
// every escape code is earned.

pub mod ansi;
pub mod color;
pub mod input;
pub mod output;
pub mod render;
pub mod style;

pub use color::CellColor;
pub use input::{KeyCode, KeyEvent, Modifiers, Parser};
pub use render::{AnsiSink, Instruction, RenderSink};
pub use style::{Attr, Style};
