// SPDX-License-Identifier: MIT
//
// One caller, one view.
//
// A session owns everything between the socket and its view: the telnet
// filter, the key decoder, and an `AnsiSink` placed at the view's screen
// origin. The view is any `ViewKind`; callers normally get the document
// editor. Bytes flow
//
//   socket → TelnetFilter → Parser → ViewKind → AnsiSink → socket
//
// and after every read the accumulated escape sequences go out in a single
// write. Screen layout:
//
//   row 0              board name
//   origin row …       the view (the editor's viewport is height rows)
//   below the editor   status line: line:col and INSERT / OVERTYPE
//
// A read that times out with a lone ESC pending turns it into the Escape
// key; without the timeout ESC would wait forever for the rest of an arrow
// key sequence that is never coming.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use n_editor::{KeyResult, Notification, View, ViewKind};
use n_term::ansi::{self, CursorShape};
use n_term::{AnsiSink, Attr, Instruction, KeyEvent, Parser, RenderSink, Style};
use tracing::{debug, info};

use crate::config::Config;
use crate::telnet::{CHARACTER_MODE, TelnetFilter};

/// How long a lone ESC may wait for the rest of a sequence.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(250);

const READ_BUFFER: usize = 1024;

/// Whether the session should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct Session<W: Write> {
    out: W,
    screen: AnsiSink,
    view: ViewKind,
    parser: Parser,
    telnet: TelnetFilter,
    title: String,
}

impl<W: Write> Session<W> {
    /// A session writing to `out`, with the view's top-left corner at
    /// screen `origin` (col, row), 0-based.
    pub fn new(
        out: W,
        view: impl Into<ViewKind>,
        origin: (u16, u16),
        title: impl Into<String>,
    ) -> Self {
        Self {
            out,
            screen: AnsiSink::new(origin.0, origin.1),
            view: view.into(),
            parser: Parser::new(),
            telnet: TelnetFilter::new(),
            title: title.into(),
        }
    }

    #[must_use]
    pub const fn view(&self) -> &ViewKind {
        &self.view
    }

    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.out
    }

    /// Draw the whole screen.
    ///
    /// # Errors
    ///
    /// Writing to the connection failed.
    pub fn start(&mut self) -> io::Result<()> {
        let raw = self.screen.raw();
        ansi::clear_screen(raw)?;
        ansi::sgr(raw, Style::PLAIN.with_attrs(Attr::BOLD))?;
        raw.push_str(&self.title);
        ansi::reset(raw)?;

        if let Some(editor) = self.view.as_editor_mut() {
            ansi::set_cursor_shape(self.screen.raw(), editor.mode().cursor_shape())?;
            editor.take_notifications();
        }
        self.view.render(&mut self.screen);
        self.draw_status()?;
        self.flush()
    }

    /// Handle bytes read from the connection.
    ///
    /// # Errors
    ///
    /// Writing to the connection failed.
    pub fn feed(&mut self, data: &[u8]) -> io::Result<Flow> {
        let bytes = self.telnet.filter(data);
        let keys = self.parser.advance(&bytes);
        self.handle_keys(keys)
    }

    /// The connection went quiet: resolve a pending lone ESC.
    ///
    /// # Errors
    ///
    /// Writing to the connection failed.
    pub fn idle(&mut self) -> io::Result<Flow> {
        if !self.parser.has_pending() {
            return Ok(Flow::Continue);
        }
        let keys = self.parser.flush();
        self.handle_keys(keys)
    }

    /// Say goodbye below the view.
    ///
    /// # Errors
    ///
    /// Writing to the connection failed.
    pub fn finish(&mut self) -> io::Result<()> {
        let text = self.view.get_text();
        let chars = text.chars().filter(|&c| c != '\n').count();
        let lines = text.split('\n').count();
        info!(chars, lines, "message finished");

        let row = self.status_row().saturating_add(1);
        let raw = self.screen.raw();
        ansi::reset(raw)?;
        ansi::set_cursor_shape(raw, CursorShape::Default)?;
        ansi::cursor_show(raw)?;
        ansi::cursor_to(raw, 0, row)?;
        write!(raw, "Message saved: {lines} line(s), {chars} char(s). Goodbye!\r\n")?;
        self.flush()
    }

    fn handle_keys(&mut self, keys: Vec<KeyEvent>) -> io::Result<Flow> {
        let mut flow = Flow::Continue;
        for key in keys {
            if self.view.handle_key(&key, &mut self.screen) == KeyResult::Exit {
                debug!(%key, "exit key");
                flow = Flow::Exit;
                break;
            }
        }
        self.apply_notifications()?;
        self.flush()?;
        Ok(flow)
    }

    fn apply_notifications(&mut self) -> io::Result<()> {
        let Some(editor) = self.view.as_editor_mut() else {
            return Ok(());
        };
        let notifications = editor.take_notifications();
        if notifications.is_empty() {
            return Ok(());
        }
        for notification in notifications {
            if let Notification::EditMode(mode) = notification {
                ansi::set_cursor_shape(self.screen.raw(), mode.cursor_shape())?;
            }
        }
        self.draw_status()
    }

    /// The row right below the view.
    fn status_row(&self) -> u16 {
        let height = self.view.as_editor().map_or(1, |editor| editor.viewport().height);
        let height = u16::try_from(height).unwrap_or(u16::MAX);
        self.screen.origin().1.saturating_add(height)
    }

    /// Rewrite the status line, then put the cursor back in the editor.
    /// Views other than the editor have no status line.
    fn draw_status(&mut self) -> io::Result<()> {
        let row = self.status_row();
        let Some(editor) = self.view.as_editor() else {
            return Ok(());
        };
        let width = editor.viewport().width;
        let mode = editor.mode().display_name();
        let mut text = format!(" {:<10} {mode}", editor.position().to_string());
        text.truncate(width);
        let text = format!("{text:<width$}");
        let cursor = Instruction::MoveTo {
            row: editor.cursor().row,
            col: editor.cursor().screen_col(editor.viewport()),
        };

        let col = self.screen.origin().0;
        let raw = self.screen.raw();
        ansi::cursor_to(raw, col, row)?;
        ansi::sgr(raw, Style::PLAIN.with_attrs(Attr::INVERSE))?;
        raw.push_str(&text);
        ansi::reset(raw)?;
        self.screen.emit(cursor);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.screen.flush_to(&mut self.out)?;
        self.out.flush()
    }
}

// ─── Connection ──────────────────────────────────────────────────────────────

/// Run a session on `stream` until the caller exits or hangs up.
///
/// # Errors
///
/// Any I/O error on the connection, or an editor the configuration cannot
/// build.
pub fn serve(stream: &TcpStream, config: &Config) -> io::Result<()> {
    let editor = config.editor.build().map_err(io::Error::other)?;
    let origin = config.editor.origin().map_err(io::Error::other)?;

    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(ESCAPE_TIMEOUT))?;
    let mut writer = stream;
    writer.write_all(&CHARACTER_MODE)?;

    let mut session = Session::new(stream, editor, origin, config.bbs_name.as_str());
    session.start()?;

    let mut reader = stream;
    let mut buf = [0u8; READ_BUFFER];
    loop {
        let flow = match reader.read(&mut buf) {
            Ok(0) => {
                info!("caller hung up");
                return Ok(());
            }
            Ok(n) => session.feed(&buf[..n])?,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                session.idle()?
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if flow == Flow::Exit {
            return session.finish();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
