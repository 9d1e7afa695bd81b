// SPDX-License-Identifier: MIT
//
// Caller input decoder.
//
// Turns the raw bytes a remote terminal sends into structured key events.
// Handles what board clients actually send over a character link:
//
// - Legacy CSI sequences (arrows, editing keys, function keys)
// - ANSI-BBS (CTerm) keypad codes: `CSI K` end, `CSI @` insert,
//   `CSI V` / `CSI U` page up / page down
// - SS3 sequences (cursor keys in application mode, F1-F4)
// - Control bytes (Ctrl+letter, backspace as either BS or DEL)
// - Alt+key (ESC followed by printable character)
// - UTF-8 multi-byte characters
//
// # Design
//
// The parser maintains a small internal byte buffer because escape
// sequences can span multiple `read()` calls — and over telnet they often
// do. Feed bytes with [`Parser::advance`], retrieve events from the
// returned `Vec`. After a timeout with no new bytes, call
// [`Parser::flush`] to emit any pending lone ESC as a real Escape keypress.
//
// Every key has a *physical name* ([`KeyEvent::name`]) such as
// `"up arrow"` or `"ctrl + y"`. Key bindings are expressed in those names,
// which keeps them readable in configuration files.

use std::fmt;

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded key press with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl).
    pub modifiers: Modifiers,
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char). Function keys use [`F`](KeyCode::F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Compatible with the xterm CSI modifier encoding where
    /// `param = 1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key press with the given modifiers.
    #[inline]
    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// The printable character this key produces, if any.
    ///
    /// `None` for named keys and for anything chorded with Ctrl or Alt.
    #[must_use]
    pub fn char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// The physical name of this key, as used in key bindings.
    ///
    /// Named keys use lowercase words (`"return"`, `"esc"`, `"del"`,
    /// `"up arrow"`, `"page down"`, `"f5"`). Modifiers are prefixed in the
    /// order ctrl, alt, shift and joined with `" + "` (`"ctrl + y"`). Shift
    /// is not reported for plain characters since it is already reflected
    /// in the character itself.
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let is_char = matches!(self.code, KeyCode::Char(_));
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("ctrl + ")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("alt + ")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) && !is_char {
            f.write_str("shift + ")?;
        }
        fmt::Display::fmt(&self.code, f)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Char(' ') => "space",
            Self::Char(c) => return write!(f, "{c}"),
            Self::F(n) => return write!(f, "f{n}"),
            Self::Enter => "return",
            Self::Tab => "tab",
            Self::Backspace => "backspace",
            Self::Escape => "esc",
            Self::Delete => "del",
            Self::Insert => "insert",
            Self::Up => "up arrow",
            Self::Down => "down arrow",
            Self::Left => "left arrow",
            Self::Right => "right arrow",
            Self::Home => "home",
            Self::End => "end",
            Self::PageUp => "page up",
            Self::PageDown => "page down",
        };
        f.write_str(name)
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Caller input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes parsing when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte escape sequence. The parser keeps a lone
/// ESC pending. The caller should wait a short timeout and then call
/// [`flush`](Parser::flush) to emit the pending ESC as a real Escape key.
#[derive(Debug)]
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return all key events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept in the internal
    /// buffer and will be combined with future [`advance`](Parser::advance)
    /// calls.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: remove consumed bytes, keep unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Called after a timeout to resolve the ESC ambiguity: a lone ESC
    /// byte becomes an Escape key event, and any other leftover ASCII
    /// becomes `Char` events. Partial UTF-8 is dropped.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::new(KeyCode::Escape)),
                0x7F => Some(KeyEvent::new(KeyCode::Backspace)),
                b @ 0x01..=0x1A => Some(KeyEvent::with(
                    KeyCode::Char((b + b'a' - 1) as char),
                    Modifiers::CTRL,
                )),
                b @ 0x20..=0x7E => Some(KeyEvent::new(KeyCode::Char(b as char))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure — they read from the front of the slice and
// return what they found plus how many bytes to consume.

/// Result of trying to parse one key from the buffer.
enum Parsed {
    /// Successfully parsed a key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single key from the front of `buf` (non-empty).
fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        // ESC — could be escape sequence or standalone Escape key.
        0x1B => parse_escape(buf),
        0x00 => Parsed::Key(ctrl_key(KeyCode::Char('@')), 1),
        0x08 | 0x7F => Parsed::Key(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(ctrl_key(KeyCode::Char((b + b'a' - 1) as char)), 1),
        // FS, GS, RS, US: no useful key identity.
        0x1C..=0x1F => Parsed::Skip(1),
        // ASCII printable.
        b @ 0x20..=0x7E => Parsed::Key(press(KeyCode::Char(b as char)), 1),
        // UTF-8 multi-byte.
        0xC0..=0xFF => parse_utf8(buf),
        // Bare continuation bytes (0x80..=0xBF) — invalid lead, skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        // CSI: ESC [
        b'[' => parse_csi(buf),
        // SS3: ESC O
        b'O' => parse_ss3(buf),
        // Alt+printable character.
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent::with(KeyCode::Char(b as char), Modifiers::ALT),
            2,
        ),
        // Anything else: the ESC stands alone, the next byte is parsed on
        // its own (a double ESC is two Escape presses).
        _ => Parsed::Key(press(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte in CSI sequence — abort.
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;

    // ── Tilde-terminated sequences (editing keys, function keys) ─────
    if final_byte == b'~' {
        let first = params.first().copied().unwrap_or(0);
        let modifiers = params
            .get(1)
            .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

        let code = match first {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            11..=15 => KeyCode::F(tilde_f_key(first, 11, 1)),
            17..=21 => KeyCode::F(tilde_f_key(first, 17, 6)),
            23..=26 => KeyCode::F(tilde_f_key(first, 23, 11)),
            28 | 29 => KeyCode::F(tilde_f_key(first, 28, 15)),
            31..=34 => KeyCode::F(tilde_f_key(first, 31, 17)),
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Key(KeyEvent::with(code, modifiers), consumed);
    }

    // ── Letter-terminated sequences ─────────────────────────────────
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' | b'K' => KeyCode::End,
        b'@' => KeyCode::Insert,
        b'V' => KeyCode::PageUp,
        b'U' => KeyCode::PageDown,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => return Parsed::Key(KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT), consumed),
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent::with(code, modifiers), consumed)
}

/// Map a tilde code within a contiguous block to its F-key number.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_f_key(code: u16, block_start: u16, first_key: u16) -> u8 {
    // Blocks are at most five wide, so the result is at most 20.
    (code - block_start + first_key) as u8
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(press(code), 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    // Validate continuation bytes (must start with 0b10xxxxxx).
    if buf[1..expected].iter().any(|&b| b & 0xC0 != 0x80) {
        return Parsed::Skip(1);
    }

    std::str::from_utf8(&buf[..expected]).map_or(Parsed::Skip(1), |s| {
        s.chars().next().map_or(Parsed::Skip(expected), |ch| {
            Parsed::Key(press(KeyCode::Char(ch)), expected)
        })
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Create a simple key press event with no modifiers.
const fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

/// Create a Ctrl+key press event.
const fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::with(code, Modifiers::CTRL)
}

/// Parse semicolon-separated CSI parameters. Empty fields are 0.
///
/// Examples:
/// - `1;2` → `[1, 2]`
/// - `;5` → `[0, 5]`
/// - (empty) → `[]`
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';').map(parse_u16).collect()
}

/// Parse a u16 from the leading digits of a byte slice (saturating).
fn parse_u16(buf: &[u8]) -> u16 {
    buf.iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |val, &b| {
            val.saturating_mul(10).saturating_add(u16::from(b - b'0'))
        })
}

/// Decode CSI modifier parameter into `Modifiers` bitflags.
///
/// The encoding is `1 + bitmask`. A parameter of 0 or 1 means no modifiers.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8..=0xFF).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: parse bytes and return all events.
    fn parse(data: &[u8]) -> Vec<KeyEvent> {
        Parser::new().advance(data)
    }

    /// Helper: parse bytes, return exactly one event.
    fn parse_one(data: &[u8]) -> KeyEvent {
        let events = parse(data);
        assert_eq!(
            events.len(),
            1,
            "expected 1 event, got {}: {:?}",
            events.len(),
            events
        );
        events[0]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::with(code, modifiers)
    }

    // ── ASCII Printable ─────────────────────────────────────────────────

    #[test]
    fn ascii_single_char() {
        assert_eq!(parse_one(b"a"), key(KeyCode::Char('a')));
    }

    #[test]
    fn ascii_multiple_chars() {
        assert_eq!(
            parse(b"abc"),
            [
                key(KeyCode::Char('a')),
                key(KeyCode::Char('b')),
                key(KeyCode::Char('c')),
            ]
        );
    }

    #[test]
    fn ascii_space() {
        assert_eq!(parse_one(b" "), key(KeyCode::Char(' ')));
    }

    // ── Control Characters ──────────────────────────────────────────────

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse_one(b"\x01"), key_mod(KeyCode::Char('a'), Modifiers::CTRL));
        assert_eq!(parse_one(b"\x16"), key_mod(KeyCode::Char('v'), Modifiers::CTRL));
        assert_eq!(parse_one(b"\x19"), key_mod(KeyCode::Char('y'), Modifiers::CTRL));
        assert_eq!(parse_one(b"\x1A"), key_mod(KeyCode::Char('z'), Modifiers::CTRL));
    }

    #[test]
    fn ctrl_at() {
        assert_eq!(parse_one(b"\x00"), key_mod(KeyCode::Char('@'), Modifiers::CTRL));
    }

    #[test]
    fn enter_cr_and_lf() {
        assert_eq!(parse_one(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), key(KeyCode::Enter));
    }

    #[test]
    fn tab() {
        assert_eq!(parse_one(b"\t"), key(KeyCode::Tab));
    }

    #[test]
    fn backspace_bs_and_del() {
        assert_eq!(parse_one(b"\x08"), key(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x7f"), key(KeyCode::Backspace));
    }

    #[test]
    fn unit_separators_skipped() {
        assert!(parse(b"\x1c\x1d\x1e\x1f").is_empty());
    }

    // ── Arrow Keys ──────────────────────────────────────────────────────

    #[test]
    fn arrows_csi() {
        assert_eq!(
            parse(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            [
                key(KeyCode::Up),
                key(KeyCode::Down),
                key(KeyCode::Right),
                key(KeyCode::Left),
            ]
        );
    }

    #[test]
    fn arrows_ss3() {
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1bOD"), key(KeyCode::Left));
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(parse_one(b"\x1b[1;2A"), key_mod(KeyCode::Up, Modifiers::SHIFT));
        assert_eq!(parse_one(b"\x1b[1;5C"), key_mod(KeyCode::Right, Modifiers::CTRL));
        assert_eq!(
            parse_one(b"\x1b[1;4D"),
            key_mod(KeyCode::Left, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    // ── Editing Keys ────────────────────────────────────────────────────

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[2~"), key(KeyCode::Insert));
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[5~"), key(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::PageDown));
        assert_eq!(parse_one(b"\x1b[7~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[8~"), key(KeyCode::End));
    }

    #[test]
    fn home_end_letters() {
        assert_eq!(parse_one(b"\x1b[H"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), key(KeyCode::End));
    }

    #[test]
    fn cterm_keypad_codes() {
        assert_eq!(parse_one(b"\x1b[K"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[@"), key(KeyCode::Insert));
        assert_eq!(parse_one(b"\x1b[V"), key(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[U"), key(KeyCode::PageDown));
    }

    #[test]
    fn ctrl_delete() {
        assert_eq!(parse_one(b"\x1b[3;5~"), key_mod(KeyCode::Delete, Modifiers::CTRL));
    }

    // ── Function Keys ───────────────────────────────────────────────────

    #[test]
    fn function_keys() {
        assert_eq!(parse_one(b"\x1bOP"), key(KeyCode::F(1)));
        assert_eq!(parse_one(b"\x1b[S"), key(KeyCode::F(4)));
        assert_eq!(parse_one(b"\x1b[11~"), key(KeyCode::F(1)));
        assert_eq!(parse_one(b"\x1b[15~"), key(KeyCode::F(5)));
        assert_eq!(parse_one(b"\x1b[17~"), key(KeyCode::F(6)));
        assert_eq!(parse_one(b"\x1b[21~"), key(KeyCode::F(10)));
        assert_eq!(parse_one(b"\x1b[23~"), key(KeyCode::F(11)));
        assert_eq!(parse_one(b"\x1b[24~"), key(KeyCode::F(12)));
        assert_eq!(parse_one(b"\x1b[34~"), key(KeyCode::F(20)));
    }

    #[test]
    fn unknown_tilde_code_skipped() {
        assert!(parse(b"\x1b[99~").is_empty());
    }

    #[test]
    fn shift_tab() {
        assert_eq!(parse_one(b"\x1b[Z"), key_mod(KeyCode::Tab, Modifiers::SHIFT));
    }

    // ── Alt ─────────────────────────────────────────────────────────────

    #[test]
    fn alt_char() {
        assert_eq!(parse_one(b"\x1bx"), key_mod(KeyCode::Char('x'), Modifiers::ALT));
    }

    #[test]
    fn double_escape_is_two_escapes() {
        let mut parser = Parser::new();
        let events = parser.advance(b"\x1b\x1b");
        assert_eq!(events, [key(KeyCode::Escape)]);
        assert_eq!(parser.flush(), [key(KeyCode::Escape)]);
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_two_byte() {
        // é = U+00E9 = 0xC3 0xA9.
        assert_eq!(parse_one(&[0xC3, 0xA9]), key(KeyCode::Char('é')));
    }

    #[test]
    fn utf8_incomplete_waits() {
        let mut parser = Parser::new();
        assert!(parser.advance(&[0xE2, 0x82]).is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(&[0xAC]), [key(KeyCode::Char('€'))]);
    }

    #[test]
    fn utf8_bad_continuation_skipped() {
        assert_eq!(parse(&[0xC3, b'a']), [key(KeyCode::Char('a'))]);
    }

    // ── Escape Timeout (flush) ──────────────────────────────────────────

    #[test]
    fn lone_escape_pending_then_flushed() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), [key(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn flush_partial_csi() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert_eq!(
            parser.flush(),
            [key(KeyCode::Escape), key(KeyCode::Char('['))]
        );
    }

    // ── Incremental Parsing ─────────────────────────────────────────────

    #[test]
    fn split_escape_sequence() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert!(parser.advance(b"1;").is_empty());
        assert_eq!(
            parser.advance(b"5Ax"),
            [key_mod(KeyCode::Up, Modifiers::CTRL), key(KeyCode::Char('x'))]
        );
    }

    // ── Physical names ──────────────────────────────────────────────────

    #[test]
    fn physical_names() {
        assert_eq!(key(KeyCode::Enter).name(), "return");
        assert_eq!(key(KeyCode::Escape).name(), "esc");
        assert_eq!(key(KeyCode::Delete).name(), "del");
        assert_eq!(key(KeyCode::Up).name(), "up arrow");
        assert_eq!(key(KeyCode::PageDown).name(), "page down");
        assert_eq!(key(KeyCode::F(7)).name(), "f7");
        assert_eq!(key(KeyCode::Char(' ')).name(), "space");
        assert_eq!(key(KeyCode::Char('Q')).name(), "Q");
    }

    #[test]
    fn physical_names_with_modifiers() {
        assert_eq!(parse_one(b"\x19").name(), "ctrl + y");
        assert_eq!(parse_one(b"\x1b[Z").name(), "shift + tab");
        assert_eq!(parse_one(b"\x1bq").name(), "alt + q");
        assert_eq!(
            key_mod(KeyCode::Char('A'), Modifiers::SHIFT).name(),
            "A",
            "shift is implied by the character"
        );
    }

    #[test]
    fn printable_char_only_without_chords() {
        assert_eq!(key(KeyCode::Char('z')).char(), Some('z'));
        assert_eq!(key_mod(KeyCode::Char('z'), Modifiers::CTRL).char(), None);
        assert_eq!(key_mod(KeyCode::Char('z'), Modifiers::ALT).char(), None);
        assert_eq!(key(KeyCode::Tab).char(), None);
    }

    // ── Internals ───────────────────────────────────────────────────────

    #[test]
    fn decode_modifier_values() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(6), Modifiers::CTRL | Modifiers::SHIFT);
    }

    #[test]
    fn csi_params() {
        assert!(parse_csi_params(b"").is_empty());
        assert_eq!(parse_csi_params(b"1;2"), [1, 2]);
        assert_eq!(parse_csi_params(b";5"), [0, 5]);
        assert_eq!(parse_csi_params(b"99999999"), [u16::MAX]);
    }
}
