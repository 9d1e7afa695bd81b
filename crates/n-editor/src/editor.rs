//! Multi-line editor — the word-wrapped document controller.
//!
//! [`MultiLineEditor`] owns the document ([`LineStore`]), the visible window
//! onto it ([`Viewport`]), the [`Cursor`], the [`EditMode`] and the
//! [`TabStops`]. Each editing command is one method. Commands never fail and
//! never do I/O: they mutate the state and describe the resulting screen
//! update as [`Instruction`]s pushed into a [`RenderSink`].
//!
//! # The edit path
//!
//! Every command that changes text rewrites whole paragraphs:
//!
//! 1. take the paragraph's visual lines and concatenate them,
//! 2. collapse tab runs back to literal tabs, keeping a map from every
//!    expanded offset to its collapsed offset,
//! 3. apply the edit to the collapsed text,
//! 4. re-wrap the result with [`TabPolicy::Expand`],
//! 5. splice the new lines in with [`LineStore::replace_range`],
//! 6. place the cursor through the wrap's position map.
//!
//! Paragraphs are therefore always in canonical wrapped form, with every
//! tab run aligned to the stops of the column it starts at.
//!
//! # Redraws
//!
//! A redraw is always `HideCursor, SetStyle, (MoveTo, Write)*, MoveTo,
//! ShowCursor` with rows emitted top to bottom, each at most once. An edit
//! that only changed the cursor's row rewrites just the changed span of it;
//! anything that moved rows redraws from the first changed row down; a
//! scroll redraws the whole viewport. Pure cursor moves emit one `MoveTo`.

use n_term::{Instruction, KeyEvent, RenderSink, Style};
use tracing::{debug, trace};

use crate::cursor::{self, Cursor, Viewport};
use crate::error::{EditorResult, check_dimensions, check_tab_size};
use crate::keymap::{EditAction, Input, SpecialKeyMap};
use crate::lines::{LineStore, VisualLine};
use crate::mode::EditMode;
use crate::position::Position;
use crate::tabs::{TabStops, collapse_tabs, collapse_tabs_mapped, run_bounds};
use crate::text::{self, is_printable};
use crate::wrap::{Bias, TabPolicy, wrap};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// What the caller should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The key did something (possibly nothing visible, e.g. a boundary).
    Handled,
    /// The key means nothing to the editor.
    Ignored,
    /// The user asked to leave the editor.
    Exit,
}

/// State changes the host may want to reflect (status line, cursor shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The cursor moved or the document changed.
    EditPosition(Position),
    /// The edit mode was toggled.
    EditMode(EditMode),
}

// ---------------------------------------------------------------------------
// Internal types
// ---------------------------------------------------------------------------

/// The collapsed text of lines `start..=end`, one string per paragraph.
struct Paragraphs {
    start: usize,
    end: usize,
    raw: Vec<Vec<char>>,
    /// Expanded offset → collapsed offset, for the first paragraph only.
    map: Vec<usize>,
}

/// A rewrite of lines `start..=end`.
struct Splice {
    start: usize,
    end: usize,
    /// Replacement paragraphs, collapsed.
    paragraphs: Vec<String>,
    /// Cursor target: paragraph index and collapsed offset within it.
    cursor: (usize, usize),
    bias: Bias,
}

/// Which part of the viewport a command invalidated.
enum Damage {
    /// Nothing on screen changed except the cursor position.
    Cursor,
    /// Only one row changed; `old` is what it showed before.
    Row { line: usize, old: String },
    /// Every row from document line `line` to the bottom.
    From(usize),
    /// The viewport scrolled.
    Viewport,
}

// ---------------------------------------------------------------------------
// MultiLineEditor
// ---------------------------------------------------------------------------

/// A word-wrapped, multi-line text editor for a fixed-size window.
#[derive(Debug, Clone)]
pub struct MultiLineEditor {
    lines: LineStore,
    viewport: Viewport,
    cursor: Cursor,
    mode: EditMode,
    tabs: TabStops,
    keymap: SpecialKeyMap,
    style: Style,
    /// Bumped on every document change.
    revision: u64,
    notifications: Vec<Notification>,
}

impl MultiLineEditor {
    /// An empty editor `width` columns wide and `height` rows tall.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidDimensions`](crate::EditorError::InvalidDimensions)
    /// if either dimension is zero,
    /// [`EditorError::InvalidTabSize`](crate::EditorError::InvalidTabSize) if
    /// `tab_size` is zero.
    pub fn new(width: usize, height: usize, tab_size: usize) -> EditorResult<Self> {
        check_dimensions(width, height)?;
        check_tab_size(tab_size)?;
        Ok(Self {
            lines: LineStore::new(),
            viewport: Viewport::new(width, height),
            cursor: Cursor::default(),
            mode: EditMode::default(),
            tabs: TabStops::new(width, tab_size),
            keymap: SpecialKeyMap::new(),
            style: Style::PLAIN,
            revision: 0,
            notifications: Vec::new(),
        })
    }

    /// Use `keymap` to translate keys.
    #[must_use]
    pub fn with_keymap(mut self, keymap: SpecialKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Draw text with `style`.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    // -- Accessors ----------------------------------------------------------

    /// Cursor position in the document (visual line, column).
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.cursor.position(&self.viewport)
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn lines(&self) -> &LineStore {
        &self.lines
    }

    #[inline]
    #[must_use]
    pub const fn tab_stops(&self) -> &TabStops {
        &self.tabs
    }

    #[inline]
    #[must_use]
    pub const fn keymap(&self) -> &SpecialKeyMap {
        &self.keymap
    }

    #[inline]
    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Drain pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // -- Document -----------------------------------------------------------

    /// Replace the document with `raw`. Line breaks of any convention split
    /// paragraphs; control chars other than tab are dropped. The cursor
    /// goes to the top-left. Call [`redraw`](Self::redraw) afterwards.
    pub fn set_document(&mut self, raw: &str) {
        let lines = self.wrap_all(text::paragraphs(raw).iter().map(String::as_str));
        debug!(lines = lines.len(), bytes = raw.len(), "document loaded");
        self.lines.reset(lines);
        self.viewport.top = 0;
        self.cursor = Cursor::default();
        self.revision += 1;
        self.notify_position();
    }

    /// The document text with tab runs collapsed to tabs. Paragraphs are
    /// joined with `'\n'` (no trailing break) or, without
    /// `include_line_breaks`, with nothing.
    #[must_use]
    pub fn get_document(&self, include_line_breaks: bool) -> String {
        let sep = if include_line_breaks { "\n" } else { "" };
        self.raw_paragraphs().join(sep)
    }

    /// Append `raw` as new paragraphs after the last one. The cursor stays
    /// put. Call [`redraw`](Self::redraw) afterwards.
    pub fn append_text(&mut self, raw: &str) {
        let new_lines = self.wrap_all(text::paragraphs(raw).iter().map(String::as_str));
        if self.lines.is_empty() {
            self.lines.reset(new_lines);
        } else {
            let last = self.lines.last_index();
            let mut lines = vec![self.lines.line(last).clone()];
            lines.extend(new_lines);
            self.lines.replace_range(last, last, lines);
        }
        self.revision += 1;
        cursor::clamp(&mut self.cursor, &mut self.viewport, &self.lines);
        self.notify_position();
    }

    /// Splice `raw` into the document at `(line, col)`, clamped to the
    /// document. `raw` may span several paragraphs. The cursor moves to the
    /// end of the inserted text. Call [`redraw`](Self::redraw) afterwards.
    pub fn insert_text_at(&mut self, line: usize, col: usize, raw: &str) {
        let line = line.min(self.lines.last_index());
        let pos = Position::new(line, col.min(self.lines.line_len(line)));

        let para = self.open(line, line);
        let at = para.map[self.expanded_offset(para.start, pos)];
        let before: String = para.raw[0][..at].iter().collect();
        let after: String = para.raw[0][at..].iter().collect();

        let mut paragraphs = text::paragraphs(raw);
        let last = paragraphs.len() - 1;
        let mut cursor_offset = paragraphs[last].chars().count();
        if last == 0 {
            cursor_offset += at;
        }
        paragraphs[0].insert_str(0, &before);
        paragraphs[last].push_str(&after);

        self.apply(Splice {
            start: para.start,
            end: para.end,
            paragraphs,
            cursor: (last, cursor_offset),
            bias: Bias::Downstream,
        });
        self.notify_position();
    }

    // -- Geometry -----------------------------------------------------------

    /// Resize the window and re-wrap the whole document. The cursor keeps
    /// its place in the text. Call [`redraw`](Self::redraw) afterwards.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidDimensions`](crate::EditorError::InvalidDimensions)
    /// if either dimension is zero; the editor is left unchanged.
    pub fn set_dimensions(&mut self, width: usize, height: usize) -> EditorResult<()> {
        check_dimensions(width, height)?;
        debug!(width, height, "resize");
        self.viewport.height = height;
        self.reflow(width, self.tabs.tab_size());
        Ok(())
    }

    /// Change the tab size and re-wrap the whole document. Call
    /// [`redraw`](Self::redraw) afterwards.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidTabSize`](crate::EditorError::InvalidTabSize)
    /// for zero; the editor is left unchanged.
    pub fn set_tab_size(&mut self, tab_size: usize) -> EditorResult<()> {
        check_tab_size(tab_size)?;
        debug!(tab_size, "tab size changed");
        self.reflow(self.viewport.width, tab_size);
        Ok(())
    }

    // -- Input --------------------------------------------------------------

    /// Translate `key` through the key map and run the matching command.
    pub fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn RenderSink) -> KeyResult {
        let input = self.keymap.translate(key);
        trace!(%key, ?input, "key");
        self.handle_input(input, sink)
    }

    /// Run the command for an already-translated input.
    pub fn handle_input(&mut self, input: Input, sink: &mut dyn RenderSink) -> KeyResult {
        match input {
            Input::Action(EditAction::Exit) => return KeyResult::Exit,
            Input::Action(action) => self.perform(action, sink),
            Input::Char(c) if is_printable(c) => self.insert_char(c, sink),
            Input::Char(_) | Input::Ignored => return KeyResult::Ignored,
        }
        KeyResult::Handled
    }

    /// Run the command bound to `action`. [`EditAction::Exit`] does nothing
    /// here; it is reported by [`handle_input`](Self::handle_input).
    pub fn perform(&mut self, action: EditAction, sink: &mut dyn RenderSink) {
        match action {
            EditAction::LineFeed => self.line_feed(sink),
            EditAction::Backspace => self.backspace(sink),
            EditAction::Delete => self.delete_forward(sink),
            EditAction::Tab => self.insert_tab(sink),
            EditAction::Up => self.move_up(sink),
            EditAction::Down => self.move_down(sink),
            EditAction::Left => self.move_left(sink),
            EditAction::Right => self.move_right(sink),
            EditAction::Home => self.home(sink),
            EditAction::End => self.end(sink),
            EditAction::PageUp => self.page_up(sink),
            EditAction::PageDown => self.page_down(sink),
            EditAction::DeleteLine => self.delete_line(sink),
            EditAction::Insert => self.toggle_mode(),
            EditAction::Exit => {}
        }
    }

    // -- Editing commands ---------------------------------------------------

    /// Type `c` at the cursor. Non-printable chars are ignored.
    ///
    /// In overtype mode the char under the cursor is replaced, unless the
    /// cursor is at the end of the line or on a tab run, where the char is
    /// inserted instead.
    pub fn insert_char(&mut self, c: char, sink: &mut dyn RenderSink) {
        if !is_printable(c) {
            return;
        }
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let line = ed.lines.line(pos.line);
            let replace = ed.mode == EditMode::Overtype
                && line.char_at(pos.col).is_some_and(|under| under != '\t');

            let mut para = ed.open(pos.line, pos.line);
            let at = para.map[ed.expanded_offset(para.start, pos)];
            if replace {
                para.raw[0][at] = c;
            } else {
                para.raw[0].insert(at, c);
            }
            ed.commit(para.into_splice((0, at + 1), Bias::Downstream), sink);
        });
    }

    /// Insert one logical tab at the cursor.
    pub fn insert_tab(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let mut para = ed.open(pos.line, pos.line);
            let at = para.map[ed.expanded_offset(para.start, pos)];
            para.raw[0].insert(at, '\t');
            ed.commit(para.into_splice((0, at + 1), Bias::Downstream), sink);
        });
    }

    /// Delete the char left of the cursor, or the whole tab it is part of.
    ///
    /// At column 0 the cursor first moves to the end of the previous line
    /// and that line is joined with the one below it.
    pub fn backspace(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            if pos.col > 0 {
                let chars = ed.lines.line(pos.line).chars();
                let (start, end) = ed.cells_of(&chars, pos.col - 1);
                ed.delete_cells(pos.line, start, end, Bias::Downstream, sink);
            } else if pos.line > 0 {
                ed.join_below(pos.line - 1, sink);
            }
        });
    }

    /// Delete the char (or tab) under the cursor. At the end of a
    /// paragraph, join the next paragraph onto this one. At a soft wrap,
    /// delete the first char of the continuation line; the cursor stays put.
    pub fn delete_forward(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let chars = ed.lines.line(pos.line).chars();
            if pos.col < chars.len() {
                let (start, end) = ed.cells_of(&chars, pos.col);
                ed.delete_cells(pos.line, start, end, Bias::Downstream, sink);
            } else if pos.line < ed.lines.last_index() {
                if ed.lines.line(pos.line).is_paragraph_end {
                    ed.join_below(pos.line, sink);
                    return;
                }
                let next = ed.lines.line(pos.line + 1).chars();
                if !next.is_empty() {
                    let (start, end) = ed.cells_of(&next, 0);
                    ed.delete_cells(pos.line + 1, start, end, Bias::Upstream, sink);
                }
            }
        });
    }

    /// Remove the visual line under the cursor.
    pub fn delete_line(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            let was_last = line == ed.lines.last_index();
            ed.lines.delete_line(line);
            ed.revision += 1;

            let target = if was_last && line > 0 {
                Position::new(line - 1, ed.lines.line_len(line - 1))
            } else {
                Position::new(line, 0)
            };
            let damage = if ed.place(target) {
                Damage::Viewport
            } else {
                Damage::From(line.min(target.line))
            };
            ed.cursor.sticky_col = ed.cursor.col;
            ed.paint(damage, sink);
        });
    }

    /// Split the paragraph at the cursor. The cursor moves to the start of
    /// the new paragraph.
    pub fn line_feed(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let mut para = ed.open(pos.line, pos.line);
            let at = para.map[ed.expanded_offset(para.start, pos)];
            let rest = para.raw[0].split_off(at);
            para.raw.push(rest);
            ed.commit(para.into_splice((1, 0), Bias::Downstream), sink);
        });
    }

    /// Flip between insert and overtype.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        debug!(mode = %self.mode, "edit mode");
        self.notifications.push(Notification::EditMode(self.mode));
    }

    // -- Movement -----------------------------------------------------------

    pub fn move_up(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            if line > 0 {
                ed.move_vertically(line - 1, sink);
            }
        });
    }

    pub fn move_down(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            if line < ed.lines.last_index() {
                ed.move_vertically(line + 1, sink);
            }
        });
    }

    /// One column left, stepping over a tab as a unit. From column 0, to
    /// the end of the previous line.
    pub fn move_left(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let target = if pos.col > 0 {
                let chars = ed.lines.line(pos.line).chars();
                Position::new(pos.line, ed.cells_of(&chars, pos.col - 1).0)
            } else if pos.line > 0 {
                Position::new(pos.line - 1, ed.lines.line_len(pos.line - 1))
            } else {
                return;
            };
            ed.move_horizontally(target, sink);
        });
    }

    /// One column right, stepping over a tab as a unit. From the end of a
    /// line, to the start of the next.
    pub fn move_right(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let pos = ed.position();
            let chars = ed.lines.line(pos.line).chars();
            let target = if pos.col < chars.len() {
                Position::new(pos.line, ed.cells_of(&chars, pos.col).1)
            } else if pos.line < ed.lines.last_index() {
                Position::new(pos.line + 1, 0)
            } else {
                return;
            };
            ed.move_horizontally(target, sink);
        });
    }

    /// First non-whitespace column of the line, or 0.
    pub fn home(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            let col = ed
                .lines
                .line(line)
                .text
                .chars()
                .position(|c| !c.is_whitespace())
                .unwrap_or(0);
            ed.move_horizontally(Position::new(line, col), sink);
        });
    }

    /// End of the visual line.
    pub fn end(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            ed.move_horizontally(Position::new(line, ed.lines.line_len(line)), sink);
        });
    }

    pub fn page_up(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            if line == 0 {
                return;
            }
            let height = ed.viewport.height;
            let old_top = ed.viewport.top;
            ed.viewport.top = old_top.saturating_sub(height);
            ed.page_to(line.saturating_sub(height), old_top, sink);
        });
    }

    pub fn page_down(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let line = ed.position().line;
            let last = ed.lines.last_index();
            if line == last {
                return;
            }
            let height = ed.viewport.height;
            let old_top = ed.viewport.top;
            let last_page = last.saturating_sub(height - 1);
            ed.viewport.top = (old_top + height).min(last_page).max(old_top);
            ed.page_to((line + height).min(last), old_top, sink);
        });
    }

    pub fn cursor_start_of_document(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            ed.place(Position::ZERO);
            ed.cursor.sticky_col = 0;
            ed.paint(Damage::Viewport, sink);
        });
    }

    pub fn cursor_end_of_document(&mut self, sink: &mut dyn RenderSink) {
        self.command(sink, |ed, sink| {
            let last = ed.lines.last_index();
            ed.place(Position::new(last, ed.lines.line_len(last)));
            ed.cursor.sticky_col = ed.cursor.col;
            ed.paint(Damage::Viewport, sink);
        });
    }

    // -- Rendering ----------------------------------------------------------

    /// Redraw the whole viewport.
    pub fn redraw(&self, sink: &mut dyn RenderSink) {
        self.paint(Damage::Viewport, sink);
    }

    /// What row `line` shows: tab cells as spaces, clipped and padded to
    /// the width. Lines past the end are blank.
    fn row_text(&self, line: usize) -> String {
        let width = self.viewport.width;
        if line < self.lines.len() {
            padded(display_cells(&self.lines.line(line).text, width), width)
        } else {
            padded(String::new(), width)
        }
    }

    fn paint(&self, damage: Damage, sink: &mut dyn RenderSink) {
        let from = match damage {
            Damage::Cursor => {
                self.emit_cursor(sink);
                return;
            }
            Damage::Row { line, old } => {
                self.paint_span(line, &old, sink);
                return;
            }
            Damage::From(line) => line.saturating_sub(self.viewport.top),
            Damage::Viewport => 0,
        };
        if from >= self.viewport.height {
            self.emit_cursor(sink);
            return;
        }

        sink.emit(Instruction::HideCursor);
        sink.emit(Instruction::SetStyle(self.style));
        for row in from..self.viewport.height {
            sink.write_at(row, 0, self.row_text(self.viewport.top + row), self.style);
        }
        self.emit_cursor(sink);
        sink.emit(Instruction::ShowCursor);
    }

    /// Rewrite only the part of row `line` that differs from `old`.
    fn paint_span(&self, line: usize, old: &str, sink: &mut dyn RenderSink) {
        let width = self.viewport.width;
        let old: Vec<char> = padded(display_cells(old, width), width).chars().collect();
        let new: Vec<char> = self.row_text(line).chars().collect();

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        if prefix == new.len() {
            self.emit_cursor(sink);
            return;
        }
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let text: String = new[prefix..new.len() - suffix].iter().collect();
        sink.emit(Instruction::HideCursor);
        sink.emit(Instruction::SetStyle(self.style));
        sink.write_at(line - self.viewport.top, prefix, text, self.style);
        self.emit_cursor(sink);
        sink.emit(Instruction::ShowCursor);
    }

    fn emit_cursor(&self, sink: &mut dyn RenderSink) {
        sink.emit(Instruction::MoveTo {
            row: self.cursor.row,
            col: self.cursor.screen_col(&self.viewport),
        });
    }

    // -- Internals ----------------------------------------------------------

    /// Run `f`, then report a position change if the cursor moved or the
    /// document changed.
    fn command(
        &mut self,
        sink: &mut dyn RenderSink,
        f: impl FnOnce(&mut Self, &mut dyn RenderSink),
    ) {
        let before = (self.position(), self.revision);
        f(self, sink);
        if (self.position(), self.revision) != before {
            trace!(position = ?self.position(), revision = self.revision, "moved");
            self.notify_position();
        }
    }

    fn notify_position(&mut self) {
        self.notifications.push(Notification::EditPosition(self.position()));
    }

    fn place(&mut self, target: Position) -> bool {
        cursor::place(&mut self.cursor, &mut self.viewport, &self.lines, target)
    }

    /// Offset of `pos` from the start of the paragraph beginning at line
    /// `start`, in expanded chars.
    fn expanded_offset(&self, start: usize, pos: Position) -> usize {
        (start..pos.line).map(|i| self.lines.line_len(i)).sum::<usize>() + pos.col
    }

    /// Collapse the paragraphs spanning lines `first` through `last`.
    fn open(&self, first: usize, last: usize) -> Paragraphs {
        let tab_size = self.tabs.tab_size();
        let start = self.lines.find_paragraph_start(first);
        let end = self.lines.find_next_paragraph_end(last);

        let mut raw = Vec::new();
        let mut map = Vec::new();
        let mut a = start;
        while a <= end {
            let b = self.lines.find_next_paragraph_end(a);
            let (text, offsets) =
                collapse_tabs_mapped(&self.lines.contiguous_text(a, b, false), tab_size);
            if raw.is_empty() {
                map = offsets;
            }
            raw.push(text.chars().collect());
            a = b + 1;
        }
        Paragraphs {
            start,
            end,
            raw,
            map,
        }
    }

    /// Every paragraph, collapsed.
    fn raw_paragraphs(&self) -> Vec<String> {
        self.lines
            .paragraphs()
            .map(|(a, b)| collapse_tabs(&self.lines.contiguous_text(a, b, false), self.tabs.tab_size()))
            .collect()
    }

    fn wrap_all<'a>(&self, paragraphs: impl Iterator<Item = &'a str>) -> Vec<VisualLine> {
        paragraphs
            .flat_map(|p| {
                wrap(p, self.viewport.width, self.tabs.tab_size(), TabPolicy::Expand).lines
            })
            .collect()
    }

    /// The cells `[start, end)` of the unit at `col`: the char itself, or
    /// the logical tab whose run it is in.
    fn cells_of(&self, chars: &[char], col: usize) -> (usize, usize) {
        if chars.get(col) != Some(&'\t') {
            return (col, col + 1);
        }
        let (run_start, run_end) = run_bounds(chars, col);
        let start = self.tabs.prev_stop(col).max(run_start);
        let end = self.tabs.next_stop(col).clamp(col + 1, run_end);
        (start, end)
    }

    /// Delete cells `[start, end)` of `line`. The cursor lands where they
    /// were, on the side of a line break that `bias` picks.
    fn delete_cells(
        &mut self,
        line: usize,
        start: usize,
        end: usize,
        bias: Bias,
        sink: &mut dyn RenderSink,
    ) {
        let mut para = self.open(line, line);
        let base = self.expanded_offset(para.start, Position::new(line, 0));
        let from = para.map[base + start];
        let to = para.map[base + end];
        para.raw[0].drain(from..to);
        self.commit(para.into_splice((0, from), bias), sink);
    }

    /// Join line `line` with the one below it: if `line` ends a paragraph,
    /// the break is removed. The cursor lands at the join.
    fn join_below(&mut self, line: usize, sink: &mut dyn RenderSink) {
        let join = Position::new(line, self.lines.line_len(line));
        let mut para = self.open(line, line + 1);
        let at = if self.lines.line(line).is_paragraph_end {
            let tail = para.raw.pop().unwrap_or_default();
            let at = para.raw[0].len();
            para.raw[0].extend(tail);
            at
        } else {
            para.map[self.expanded_offset(para.start, join)]
        };
        self.commit(para.into_splice((0, at), Bias::Upstream), sink);
    }

    fn move_vertically(&mut self, line: usize, sink: &mut dyn RenderSink) {
        let col = self.landing_col(line, self.cursor.sticky_col);
        let damage = if self.place(Position::new(line, col)) {
            Damage::Viewport
        } else {
            Damage::Cursor
        };
        self.paint(damage, sink);
    }

    fn move_horizontally(&mut self, target: Position, sink: &mut dyn RenderSink) {
        let damage = if self.place(target) {
            Damage::Viewport
        } else {
            Damage::Cursor
        };
        self.cursor.sticky_col = self.cursor.col;
        self.paint(damage, sink);
    }

    /// Finish a page move: `viewport.top` is already set.
    fn page_to(&mut self, line: usize, old_top: usize, sink: &mut dyn RenderSink) {
        let col = self.landing_col(line, self.cursor.sticky_col);
        self.place(Position::new(line, col));
        let damage = if self.viewport.top == old_top {
            Damage::Cursor
        } else {
            Damage::Viewport
        };
        self.paint(damage, sink);
    }

    /// Where a vertical move aiming for `col` lands on `line`: clamped to
    /// the line, and snapped to the nearest stop inside a tab run.
    fn landing_col(&self, line: usize, col: usize) -> usize {
        let chars = self.lines.line(line).chars();
        let col = col.min(chars.len());
        if col == 0 || chars.get(col) != Some(&'\t') || chars[col - 1] != '\t' {
            return col;
        }
        let (start, end) = run_bounds(&chars, col);
        self.tabs.nearest_stop(col).clamp(start, end)
    }

    /// Re-wrap everything for a new width or tab size, keeping the cursor
    /// on the same char.
    fn reflow(&mut self, width: usize, tab_size: usize) {
        let pos = self.position();
        let (start, _) = self.lines.paragraph_bounds(pos.line);
        let cursor_para = self.lines.paragraphs().take_while(|&(a, _)| a < start).count();
        let cursor_offset = self.open(pos.line, pos.line).map[self.expanded_offset(start, pos)];
        let raw = self.raw_paragraphs();

        self.viewport.width = width;
        self.tabs = TabStops::new(width, tab_size);

        let mut lines = Vec::new();
        let mut target = Position::ZERO;
        for (i, text) in raw.iter().enumerate() {
            let wrapped = wrap(text, width, tab_size, TabPolicy::Expand);
            if i == cursor_para {
                let at = wrapped.position_of(cursor_offset, Bias::Downstream);
                target = Position::new(lines.len() + at.line, at.col);
            }
            lines.extend(wrapped.lines);
        }
        debug!(width, tab_size, lines = lines.len(), "reflowed");

        self.lines.reset(lines);
        self.revision += 1;
        self.place(target);
        self.cursor.sticky_col = self.cursor.col;
    }

    /// Splice, place the cursor, then repaint what changed.
    fn commit(&mut self, splice: Splice, sink: &mut dyn RenderSink) {
        let damage = self.apply(splice);
        self.paint(damage, sink);
    }

    fn apply(&mut self, splice: Splice) -> Damage {
        let old_line = self.position().line;
        let width = self.viewport.width;
        let tab_size = self.tabs.tab_size();

        let mut new_lines = Vec::new();
        let mut target = Position::new(splice.start, 0);
        for (i, raw) in splice.paragraphs.iter().enumerate() {
            let wrapped = wrap(raw, width, tab_size, TabPolicy::Expand);
            if i == splice.cursor.0 {
                let at = wrapped.position_of(splice.cursor.1, splice.bias);
                target = Position::new(splice.start + new_lines.len() + at.line, at.col);
            }
            new_lines.extend(wrapped.lines);
        }

        let old = &self.lines.lines()[splice.start..=splice.end];
        let changed: Vec<usize> = old
            .iter()
            .zip(&new_lines)
            .enumerate()
            .filter_map(|(i, (a, b))| (a != b).then_some(i))
            .collect();
        let damage = if old.len() != new_lines.len() {
            let first = changed.first().copied().unwrap_or(old.len().min(new_lines.len()));
            Damage::From((splice.start + first).min(old_line))
        } else {
            match changed.as_slice() {
                [] => Damage::Cursor,
                [i] if splice.start + i == old_line => Damage::Row {
                    line: old_line,
                    old: old[*i].text.clone(),
                },
                [first, ..] => Damage::From((splice.start + first).min(old_line)),
            }
        };

        trace!(
            start = splice.start,
            old = old.len(),
            new = new_lines.len(),
            "paragraph rewritten"
        );
        self.lines.replace_range(splice.start, splice.end, new_lines);
        self.revision += 1;

        let scrolled = self.place(target);
        self.cursor.sticky_col = self.cursor.col;
        if scrolled { Damage::Viewport } else { damage }
    }
}

impl Paragraphs {
    fn into_splice(self, cursor: (usize, usize), bias: Bias) -> Splice {
        Splice {
            start: self.start,
            end: self.end,
            paragraphs: self.raw.into_iter().map(|p| p.into_iter().collect()).collect(),
            cursor,
            bias,
        }
    }
}

/// `text` as it appears on screen: tab cells as spaces, at most `width`
/// columns.
fn display_cells(text: &str, width: usize) -> String {
    text.chars()
        .take(width)
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect()
}

fn padded(mut text: String, width: usize) -> String {
    let used = text.chars().count();
    text.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
