// SPDX-License-Identifier: MIT
//
// Terminal colors as they travel over the wire.
//
// Board callers connect with anything from SyncTERM to a stock xterm, so
// the palette is deliberately small: the 16 classic ANSI colors cover every
// client, the 256-color cube and 24-bit RGB are there for clients that ask
// for more. Colors are parsed from configuration strings ("bright cyan",
// "#5fafd7", "123") and rendered by `ansi::fg` / `ansi::bg`.

use std::fmt;
use std::str::FromStr;

// ─── CellColor ───────────────────────────────────────────────────────────────

/// A color as written to the terminal.
///
/// Small and `Copy` so the output layer can compare the last emitted color
/// against the next one cheaply and skip redundant SGR sequences.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index. Indices 0–15 are the classic colors.
    Ansi256(u8),

    /// Terminal default color (inherits from the caller's settings).
    #[default]
    Default,
}

/// Names of the 16 classic ANSI colors, in palette order.
const NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl CellColor {
    pub const BLACK: Self = Self::Ansi256(0);
    pub const RED: Self = Self::Ansi256(1);
    pub const GREEN: Self = Self::Ansi256(2);
    pub const YELLOW: Self = Self::Ansi256(3);
    pub const BLUE: Self = Self::Ansi256(4);
    pub const MAGENTA: Self = Self::Ansi256(5);
    pub const CYAN: Self = Self::Ansi256(6);
    pub const WHITE: Self = Self::Ansi256(7);

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// The bright variant of a classic color (`red` → `bright red`).
    /// Colors outside 0–7 are returned unchanged.
    #[must_use]
    pub const fn bright(self) -> Self {
        match self {
            Self::Ansi256(idx) if idx < 8 => Self::Ansi256(idx + 8),
            other => other,
        }
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ansi256(idx) if *idx < 8 => f.write_str(NAMES[*idx as usize]),
            Self::Ansi256(idx) if *idx < 16 => {
                write!(f, "bright {}", NAMES[(*idx - 8) as usize])
            }
            Self::Ansi256(idx) => write!(f, "{idx}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Error returned when a color string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color: {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for CellColor {
    type Err = ParseColorError;

    /// Accepts `default`, a classic color name optionally prefixed with
    /// `bright `, a palette index `0`–`255`, or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let err = || ParseColorError(s.to_owned());

        if name == "default" {
            return Ok(Self::Default);
        }
        if let Some(hex) = name.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Ok(idx) = name.parse::<u8>() {
            return Ok(Self::Ansi256(idx));
        }

        let (bright, base) = name
            .strip_prefix("bright ")
            .map_or((false, name.as_str()), |rest| (true, rest.trim_start()));
        let idx = NAMES.iter().position(|n| *n == base).ok_or_else(err)?;
        // Safe: NAMES has 8 entries.
        #[allow(clippy::cast_possible_truncation)]
        let color = Self::Ansi256(idx as u8);
        Ok(if bright { color.bright() } else { color })
    }
}

fn parse_hex(hex: &str) -> Option<CellColor> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(CellColor::Rgb(byte(0)?, byte(2)?, byte(4)?))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
