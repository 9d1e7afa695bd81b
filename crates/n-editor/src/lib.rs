//! # n-editor — Editor core for n-bbs
//!
//! A word-wrapped, multi-line text editor that runs over a plain character
//! link. It knows nothing about sockets or terminals: keys come in as
//! [`n_term::KeyEvent`]s and screen updates go out as
//! [`n_term::Instruction`]s.
//!
//! - **[`position`]** — `Position` (visual line, col), 0-indexed
//! - **[`lines`]** — the document as visual lines grouped into paragraphs
//! - **[`tabs`]** — tab stops, tab runs and collapsing runs back to tabs
//! - **[`wrap`]** — the word-wrap layout of one paragraph
//! - **[`text`]** — splitting and cleaning text coming from outside
//! - **[`cursor`]** — cursor, viewport and the clamping routine
//! - **[`mode`]** — insert / overtype
//! - **[`keymap`]** — physical key names to editing actions
//! - **[`editor`]** — `MultiLineEditor`, the controller tying it together
//! - **[`view`]** — the `View` protocol and the views a session can show

pub mod cursor;
pub mod editor;
pub mod error;
pub mod keymap;
pub mod lines;
pub mod mode;
pub mod position;
pub mod tabs;
pub mod text;
pub mod view;
pub mod wrap;

pub use editor::{KeyResult, MultiLineEditor, Notification};
pub use error::{EditorError, EditorResult};
pub use keymap::{EditAction, Input, KeyNames, SpecialKeyMap};
pub use mode::EditMode;
pub use position::Position;
pub use view::{EditableLine, PlainText, View, ViewKind};
