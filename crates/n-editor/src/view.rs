//! Views — the things a session can put on screen and feed keys to.
//!
//! Every view speaks the same four-method [`View`] protocol. [`ViewKind`]
//! is the closed set of views a session can hold; it dispatches by `match`
//! rather than through a trait object, so adding a view means adding a
//! variant:
//!
//! - [`PlainText`]: static text, clipped or padded to its width
//! - [`EditableLine`]: a single-line input field (user names, passwords)
//! - [`MultiLineEditor`]: the full word-wrapped document editor
//!
//! All coordinates are view-relative; the sink maps them to the screen.

use n_term::{Instruction, KeyEvent, RenderSink, Style};

use crate::editor::{KeyResult, MultiLineEditor};
use crate::keymap::{EditAction, Input, SpecialKeyMap};

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// The common view protocol.
pub trait View {
    /// Feed one key, writing any screen update into `sink`.
    fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn RenderSink) -> KeyResult;

    /// Draw the whole view.
    fn render(&self, sink: &mut dyn RenderSink);

    /// Replace the view's text. Call [`render`](Self::render) afterwards.
    fn set_text(&mut self, text: &str);

    fn get_text(&self) -> String;
}

// ---------------------------------------------------------------------------
// PlainText
// ---------------------------------------------------------------------------

/// Static single-row text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainText {
    text: String,
    width: usize,
    style: Style,
}

impl PlainText {
    #[must_use]
    pub fn new(text: impl Into<String>, width: usize) -> Self {
        Self {
            text: text.into(),
            width,
            style: Style::PLAIN,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl View for PlainText {
    fn handle_key(&mut self, _key: &KeyEvent, _sink: &mut dyn RenderSink) -> KeyResult {
        KeyResult::Ignored
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        let mut row: String = self
            .text
            .chars()
            .filter(|c| !c.is_control())
            .take(self.width)
            .collect();
        let used = row.chars().count();
        row.extend(std::iter::repeat_n(' ', self.width - used));

        sink.emit(Instruction::HideCursor);
        sink.emit(Instruction::SetStyle(self.style));
        sink.write_at(0, 0, row, self.style);
        sink.emit(Instruction::ShowCursor);
    }

    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    fn get_text(&self) -> String {
        self.text.clone()
    }
}

// ---------------------------------------------------------------------------
// EditableLine
// ---------------------------------------------------------------------------

/// A single-line input field of at most `max_len` chars.
///
/// Printable chars append, backspace erases the last char, line feed or
/// exit finish the field (reported as [`KeyResult::Exit`]). With a mask
/// char set, every char is echoed as the mask.
#[derive(Debug, Clone)]
pub struct EditableLine {
    text: Vec<char>,
    max_len: usize,
    mask: Option<char>,
    style: Style,
    keymap: SpecialKeyMap,
}

impl EditableLine {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            text: Vec::new(),
            max_len,
            mask: None,
            style: Style::PLAIN,
            keymap: SpecialKeyMap::new(),
        }
    }

    /// Echo every char as `mask`.
    #[must_use]
    pub fn masked(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: SpecialKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn echo(&self, c: char) -> char {
        self.mask.unwrap_or(c)
    }

    /// Write `text` at column `col`, then leave the cursor after the last
    /// char.
    fn paint(&self, col: usize, text: String, sink: &mut dyn RenderSink) {
        sink.emit(Instruction::HideCursor);
        sink.emit(Instruction::SetStyle(self.style));
        sink.write_at(0, col, text, self.style);
        sink.emit(Instruction::MoveTo {
            row: 0,
            col: self.text.len(),
        });
        sink.emit(Instruction::ShowCursor);
    }
}

impl View for EditableLine {
    fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn RenderSink) -> KeyResult {
        match self.keymap.translate(key) {
            Input::Action(EditAction::LineFeed | EditAction::Exit) => KeyResult::Exit,
            Input::Action(EditAction::Backspace) => {
                if self.text.pop().is_some() {
                    self.paint(self.text.len(), " ".to_owned(), sink);
                }
                KeyResult::Handled
            }
            Input::Char(c) => {
                if self.text.len() < self.max_len {
                    self.text.push(c);
                    self.paint(self.text.len() - 1, self.echo(c).to_string(), sink);
                }
                KeyResult::Handled
            }
            Input::Action(_) | Input::Ignored => KeyResult::Ignored,
        }
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        let mut row: String = self.text.iter().map(|&c| self.echo(c)).collect();
        row.extend(std::iter::repeat_n(' ', self.max_len - self.text.len()));
        self.paint(0, row, sink);
    }

    /// Control chars are dropped and the text is cut to `max_len`.
    fn set_text(&mut self, text: &str) {
        self.text = text
            .chars()
            .filter(|&c| crate::text::is_printable(c))
            .take(self.max_len)
            .collect();
    }

    fn get_text(&self) -> String {
        self.text.iter().collect()
    }
}

// ---------------------------------------------------------------------------
// MultiLineEditor
// ---------------------------------------------------------------------------

impl View for MultiLineEditor {
    fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn RenderSink) -> KeyResult {
        Self::handle_key(self, key, sink)
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        self.redraw(sink);
    }

    fn set_text(&mut self, text: &str) {
        self.set_document(text);
    }

    fn get_text(&self) -> String {
        self.get_document(true)
    }
}

// ---------------------------------------------------------------------------
// ViewKind
// ---------------------------------------------------------------------------

/// Any view a session can hold.
#[derive(Debug, Clone)]
pub enum ViewKind {
    PlainText(PlainText),
    EditableLine(EditableLine),
    EditableDocument(Box<MultiLineEditor>),
}

impl ViewKind {
    /// The document editor, if this is one.
    #[must_use]
    pub fn as_editor(&self) -> Option<&MultiLineEditor> {
        match self {
            Self::EditableDocument(editor) => Some(&**editor),
            _ => None,
        }
    }

    /// Mutable access to the document editor, if this is one.
    #[must_use]
    pub fn as_editor_mut(&mut self) -> Option<&mut MultiLineEditor> {
        match self {
            Self::EditableDocument(editor) => Some(&mut **editor),
            _ => None,
        }
    }
}

impl View for ViewKind {
    fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn RenderSink) -> KeyResult {
        match self {
            Self::PlainText(v) => v.handle_key(key, sink),
            Self::EditableLine(v) => v.handle_key(key, sink),
            Self::EditableDocument(v) => v.handle_key(key, sink),
        }
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        match self {
            Self::PlainText(v) => v.render(sink),
            Self::EditableLine(v) => v.render(sink),
            Self::EditableDocument(v) => v.redraw(sink),
        }
    }

    fn set_text(&mut self, text: &str) {
        match self {
            Self::PlainText(v) => v.set_text(text),
            Self::EditableLine(v) => v.set_text(text),
            Self::EditableDocument(v) => v.set_document(text),
        }
    }

    fn get_text(&self) -> String {
        match self {
            Self::PlainText(v) => v.get_text(),
            Self::EditableLine(v) => v.get_text(),
            Self::EditableDocument(v) => v.get_document(true),
        }
    }
}

impl From<MultiLineEditor> for ViewKind {
    fn from(editor: MultiLineEditor) -> Self {
        Self::EditableDocument(Box::new(editor))
    }
}

impl From<EditableLine> for ViewKind {
    fn from(line: EditableLine) -> Self {
        Self::EditableLine(line)
    }
}

impl From<PlainText> for ViewKind {
    fn from(text: PlainText) -> Self {
        Self::PlainText(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
