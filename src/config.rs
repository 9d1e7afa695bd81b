// SPDX-License-Identifier: MIT
//
// Board configuration.
//
// One JSON file, every field optional. Anything left out takes the default
// below, so an empty `{}` (or no file at all) is a working board:
//
//   {
//     "bbsName": "Another Fine BBS",
//     "servers": { "telnet": { "port": 8888 } },
//     "editor": {
//       "width": 79, "height": 20, "tabSize": 4,
//       "textColor": "bright white",
//       "specialKeys": { "exit": ["esc", "ctrl + x"] }
//     }
//   }
//
// `row` and `col` place the editor's top-left corner on the caller's screen
// and are 1-based like everything else a sysop reads in ANSI art tools.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use n_editor::{EditAction, EditorError, KeyNames, MultiLineEditor, SpecialKeyMap};
use n_term::color::ParseColorError;
use n_term::{CellColor, Style};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked for in the working directory when no `--config` is given.
pub const DEFAULT_PATH: &str = "n-bbs.json";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("editor text color")]
    Color(#[from] ParseColorError),

    #[error("editor geometry")]
    Editor(#[from] EditorError),

    #[error("editor origin {row},{col} is off screen: row and col start at 1")]
    Origin { row: u16, col: u16 },
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Shown on the title line of every session.
    pub bbs_name: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub servers: Servers,
    pub editor: EditorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bbs_name: "Another Fine BBS".into(),
            log_level: "info".into(),
            servers: Servers::default(),
            editor: EditorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Servers {
    pub telnet: TelnetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelnetConfig {
    pub enabled: bool,
    pub bind: String,
    pub port: u16,
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0".into(),
            port: 8888,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub width: usize,
    pub height: usize,
    /// Screen row of the editor's top line, 1-based.
    pub row: u16,
    /// Screen column of the editor's left edge, 1-based.
    pub col: u16,
    pub tab_size: usize,
    /// Any color `CellColor` parses: a name, `bright <name>`, `0`-`255` or
    /// `#rrggbb`.
    pub text_color: String,
    /// Per-action key overrides. An action listed here loses its default
    /// keys.
    pub special_keys: HashMap<EditAction, KeyNames>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 79,
            height: 20,
            row: 3,
            col: 1,
            tab_size: 4,
            text_color: "default".into(),
            special_keys: HashMap::new(),
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

impl Config {
    /// Read the configuration from `path`, or from [`DEFAULT_PATH`] if none
    /// is given.
    ///
    /// A missing default file means defaults. A file named explicitly must
    /// exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let explicit = path.is_some();
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_PATH), Path::to_path_buf);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !explicit && e.kind() == io::ErrorKind::NotFound => {
                return Ok((Self::default(), ConfigSource::Defaults));
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        match serde_json::from_str(&text) {
            Ok(config) => Ok((config, ConfigSource::File(path))),
            Err(source) => Err(ConfigError::Parse { path, source }),
        }
    }

    /// Check everything a session would otherwise trip over at connect
    /// time.
    ///
    /// # Errors
    ///
    /// The first invalid editor setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.editor.build()?;
        Ok(())
    }
}

impl EditorConfig {
    /// The editor's text style.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Color`] for an unknown color.
    pub fn text_style(&self) -> Result<Style, ConfigError> {
        let color: CellColor = self.text_color.parse()?;
        Ok(Style::fg(color))
    }

    /// Screen `(col, row)` of the editor's top-left corner, 0-based.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Origin`] if `row` or `col` is 0.
    pub const fn origin(&self) -> Result<(u16, u16), ConfigError> {
        if self.row == 0 || self.col == 0 {
            return Err(ConfigError::Origin {
                row: self.row,
                col: self.col,
            });
        }
        Ok((self.col - 1, self.row - 1))
    }

    /// A fresh, empty editor with these settings.
    ///
    /// # Errors
    ///
    /// Any invalid geometry, color or origin.
    pub fn build(&self) -> Result<MultiLineEditor, ConfigError> {
        self.origin()?;
        let editor = MultiLineEditor::new(self.width, self.height, self.tab_size)?
            .with_keymap(SpecialKeyMap::with_overrides(&self.special_keys))
            .with_style(self.text_style()?);
        Ok(editor)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).expect("valid config")
    }

    #[test]
    fn empty_object_is_defaults() {
        assert_eq!(parse("{}"), Config::default());
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.servers.telnet.port, 8888);
        assert!(config.servers.telnet.enabled);
        assert_eq!((config.editor.width, config.editor.height), (79, 20));
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.editor.origin().ok(), Some((0, 2)));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(r#"{ "bbsName": "Test Board", "editor": { "width": 40 } }"#);
        assert_eq!(config.bbs_name, "Test Board");
        assert_eq!(config.editor.width, 40);
        assert_eq!(config.editor.height, 20);
        assert_eq!(config.servers, Servers::default());
    }

    #[test]
    fn special_keys_reach_the_editor() {
        let config = parse(r#"{ "editor": { "specialKeys": { "exit": ["ctrl + x"] } } }"#);
        let editor = config.editor.build().expect("valid editor");
        assert_eq!(editor.keymap().keys_for(EditAction::Exit), ["ctrl + x"]);
    }

    #[test]
    fn text_color() {
        let mut editor = EditorConfig::default();
        assert_eq!(editor.text_style().ok(), Some(Style::PLAIN));
        editor.text_color = "bright white".into();
        assert_eq!(editor.text_style().ok(), Some(Style::fg(CellColor::WHITE.bright())));
        editor.text_color = "chartreuse".into();
        assert!(matches!(editor.text_style(), Err(ConfigError::Color(_))));
    }

    #[test]
    fn invalid_editor_rejected() {
        let mut config = Config::default();
        config.editor.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Editor(EditorError::InvalidDimensions { width: 79, height: 0 }))
        ));

        let mut config = Config::default();
        config.editor.col = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Origin { row: 3, col: 0 })));
    }

    #[test]
    fn unknown_action_is_a_parse_error() {
        let result: Result<Config, _> =
            serde_json::from_str(r#"{ "editor": { "specialKeys": { "sneeze": "f1" } } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/n-bbs/config.json");
        assert!(matches!(Config::load(Some(path)), Err(ConfigError::Read { .. })));
    }
}
