//! Special key map — physical key names to editing actions.
//!
//! The input decoder names every key it recognizes (`"up arrow"`,
//! `"ctrl + y"`, `"return"`, see [`KeyEvent::name`]). The editor does not
//! care which physical key was pressed, only which [`EditAction`] it stands
//! for. [`SpecialKeyMap`] is that translation, with a default table that can
//! be overridden per action from configuration:
//!
//! ```json
//! { "delete line": ["ctrl + y", "ctrl + k"], "exit": "ctrl + x" }
//! ```
//!
//! Keys that map to no action and carry a printable char become
//! [`Input::Char`]; everything else is [`Input::Ignored`].

use std::collections::HashMap;
use std::fmt;

use n_term::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::text::is_printable;

// ---------------------------------------------------------------------------
// EditAction
// ---------------------------------------------------------------------------

/// A logical editing action, independent of the key that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditAction {
    #[serde(rename = "line feed")]
    LineFeed,
    #[serde(rename = "exit")]
    Exit,
    #[serde(rename = "backspace")]
    Backspace,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "tab")]
    Tab,
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "end")]
    End,
    #[serde(rename = "page up")]
    PageUp,
    #[serde(rename = "page down")]
    PageDown,
    #[serde(rename = "delete line")]
    DeleteLine,
    /// Toggle insert/overtype.
    #[serde(rename = "insert")]
    Insert,
}

impl EditAction {
    pub const ALL: [Self; 15] = [
        Self::LineFeed,
        Self::Exit,
        Self::Backspace,
        Self::Delete,
        Self::Tab,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Home,
        Self::End,
        Self::PageUp,
        Self::PageDown,
        Self::DeleteLine,
        Self::Insert,
    ];

    /// The action's configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LineFeed => "line feed",
            Self::Exit => "exit",
            Self::Backspace => "backspace",
            Self::Delete => "delete",
            Self::Tab => "tab",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Home => "home",
            Self::End => "end",
            Self::PageUp => "page up",
            Self::PageDown => "page down",
            Self::DeleteLine => "delete line",
            Self::Insert => "insert",
        }
    }

    /// Physical key names bound to this action by default.
    #[must_use]
    pub const fn default_keys(self) -> &'static [&'static str] {
        match self {
            Self::LineFeed => &["return"],
            Self::Exit => &["esc"],
            Self::Backspace => &["backspace"],
            Self::Delete => &["del"],
            Self::Tab => &["tab"],
            Self::Up => &["up arrow"],
            Self::Down => &["down arrow"],
            Self::Left => &["left arrow"],
            Self::Right => &["right arrow"],
            Self::Home => &["home"],
            Self::End => &["end"],
            Self::PageUp => &["page up"],
            Self::PageDown => &["page down"],
            Self::DeleteLine => &["ctrl + y"],
            Self::Insert => &["insert", "ctrl + v"],
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// KeyNames
// ---------------------------------------------------------------------------

/// One key name or a list of them, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyNames {
    One(String),
    Many(Vec<String>),
}

impl KeyNames {
    fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(name) => std::slice::from_ref(name).iter(),
            Self::Many(names) => names.iter(),
        }
        .map(String::as_str)
    }
}

/// Canonical spelling of a key name: lowercase, `" + "` between parts.
///
/// Lets configuration say `"Ctrl+Y"` for the decoder's `"ctrl + y"`.
#[must_use]
pub fn normalize_key_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    if name == "+" || !name.contains('+') {
        return name.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    name.split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" + ")
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A decoded key as the editor sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Action(EditAction),
    Char(char),
    /// Recognized by the decoder but meaningless to the editor.
    Ignored,
}

// ---------------------------------------------------------------------------
// SpecialKeyMap
// ---------------------------------------------------------------------------

/// Physical key name → action lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialKeyMap {
    by_key: HashMap<String, EditAction>,
}

impl SpecialKeyMap {
    /// The default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut map = Self {
            by_key: HashMap::new(),
        };
        for action in EditAction::ALL {
            map.bind(action, action.default_keys().iter().copied());
        }
        map
    }

    /// Defaults with `overrides` applied. An overridden action loses its
    /// default keys.
    #[must_use]
    pub fn with_overrides(overrides: &HashMap<EditAction, KeyNames>) -> Self {
        let mut map = Self::new();
        for (&action, names) in overrides {
            map.bind(action, names.iter());
        }
        map
    }

    /// Replace every binding of `action` with `keys`. A key already bound
    /// to another action moves to this one.
    pub fn bind<'a>(&mut self, action: EditAction, keys: impl IntoIterator<Item = &'a str>) {
        self.by_key.retain(|_, bound| *bound != action);
        for key in keys {
            let key = normalize_key_name(key);
            if let Some(previous) = self.by_key.insert(key.clone(), action) {
                if previous != action {
                    tracing::debug!(%key, from = %previous, to = %action, "key rebound");
                }
            }
        }
    }

    /// The action bound to physical key `name`, if any.
    #[must_use]
    pub fn action_for(&self, name: &str) -> Option<EditAction> {
        self.by_key.get(&normalize_key_name(name)).copied()
    }

    /// Keys bound to `action`, sorted.
    #[must_use]
    pub fn keys_for(&self, action: EditAction) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .by_key
            .iter()
            .filter(|&(_, &bound)| bound == action)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Classify a decoded key.
    #[must_use]
    pub fn translate(&self, key: &KeyEvent) -> Input {
        if let Some(action) = self.action_for(&key.name()) {
            return Input::Action(action);
        }
        match key.char() {
            Some(c) if is_printable(c) => Input::Char(c),
            _ => Input::Ignored,
        }
    }
}

impl Default for SpecialKeyMap {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use n_term::{KeyCode, Modifiers};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    #[test]
    fn defaults_cover_every_action() {
        let map = SpecialKeyMap::new();
        for action in EditAction::ALL {
            assert!(!map.keys_for(action).is_empty(), "{action} unbound");
        }
        assert_eq!(map.keys_for(EditAction::Insert), ["ctrl + v", "insert"]);
    }

    #[test]
    fn translate_special_keys() {
        let map = SpecialKeyMap::new();
        assert_eq!(map.translate(&key(KeyCode::Enter)), Input::Action(EditAction::LineFeed));
        assert_eq!(map.translate(&key(KeyCode::Up)), Input::Action(EditAction::Up));
        assert_eq!(map.translate(&key(KeyCode::Escape)), Input::Action(EditAction::Exit));
        assert_eq!(
            map.translate(&KeyEvent::with(KeyCode::Char('y'), Modifiers::CTRL)),
            Input::Action(EditAction::DeleteLine)
        );
    }

    #[test]
    fn translate_chars() {
        let map = SpecialKeyMap::new();
        assert_eq!(map.translate(&key(KeyCode::Char('x'))), Input::Char('x'));
        assert_eq!(map.translate(&key(KeyCode::Char(' '))), Input::Char(' '));
        assert_eq!(
            map.translate(&KeyEvent::with(KeyCode::Char('q'), Modifiers::CTRL)),
            Input::Ignored
        );
        assert_eq!(map.translate(&key(KeyCode::F(5))), Input::Ignored);
    }

    #[test]
    fn normalize_names() {
        assert_eq!(normalize_key_name("Ctrl+Y"), "ctrl + y");
        assert_eq!(normalize_key_name("  page   up "), "page up");
        assert_eq!(normalize_key_name("ctrl + y"), "ctrl + y");
        assert_eq!(normalize_key_name("+"), "+");
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides: HashMap<EditAction, KeyNames> =
            serde_json::from_str(r#"{ "exit": "ctrl + x", "delete line": ["Ctrl+K", "f8"] }"#)
                .expect("valid overrides");
        let map = SpecialKeyMap::with_overrides(&overrides);
        assert_eq!(map.keys_for(EditAction::Exit), ["ctrl + x"]);
        assert_eq!(map.action_for("esc"), None);
        assert_eq!(map.action_for("ctrl + k"), Some(EditAction::DeleteLine));
        assert_eq!(map.action_for("ctrl + y"), None);
        assert_eq!(map.action_for("return"), Some(EditAction::LineFeed));
    }

    #[test]
    fn rebinding_a_key_moves_it() {
        let mut map = SpecialKeyMap::new();
        map.bind(EditAction::Exit, ["ctrl + v"]);
        assert_eq!(map.action_for("ctrl + v"), Some(EditAction::Exit));
        assert_eq!(map.keys_for(EditAction::Insert), ["insert"]);
    }
}
