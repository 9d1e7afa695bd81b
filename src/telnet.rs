// SPDX-License-Identifier: MIT
//
// Telnet: just enough of RFC 854 to get a raw character stream.
//
// On connect the server asks for character-at-a-time mode: it will echo,
// both sides suppress go-ahead, and the client should not run its own line
// editor. Whatever the client answers is swallowed by `TelnetFilter`, which
// also folds the NVT end-of-line forms `CR LF` and `CR NUL` into a single
// CR so the key decoder sees one Enter per keypress.

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const NOP: u8 = 241;
pub const SE: u8 = 240;

pub const ECHO: u8 = 1;
pub const SUPPRESS_GO_AHEAD: u8 = 3;
pub const LINEMODE: u8 = 34;

/// Sent once per connection.
#[rustfmt::skip]
pub const CHARACTER_MODE: [u8; 12] = [
    IAC, WILL, ECHO,
    IAC, WILL, SUPPRESS_GO_AHEAD,
    IAC, DO, SUPPRESS_GO_AHEAD,
    IAC, DONT, LINEMODE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    /// Last byte was a CR.
    Cr,
    /// Last byte was IAC.
    Command,
    /// Inside `IAC WILL|WONT|DO|DONT`, waiting for the option byte.
    Option,
    /// Inside `IAC SB ... IAC SE`.
    Sub,
    /// Saw IAC inside a subnegotiation.
    SubIac,
}

/// Strips telnet commands from a byte stream.
///
/// Stateful: a command split across two reads is still removed.
#[derive(Debug, Default)]
pub struct TelnetFilter {
    state: State,
}

impl TelnetFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The data bytes in `input`.
    pub fn filter(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        for &byte in input {
            if self.state == State::Cr {
                self.state = State::Data;
                if byte == b'\n' || byte == 0 {
                    continue;
                }
            }
            self.state = match (self.state, byte) {
                (State::Data | State::Cr, IAC) => State::Command,
                (State::Data | State::Cr, b'\r') => {
                    out.push(b'\r');
                    State::Cr
                }
                (State::Data | State::Cr, b) => {
                    out.push(b);
                    State::Data
                }
                (State::Command, IAC) => {
                    out.push(IAC);
                    State::Data
                }
                (State::Command, WILL | WONT | DO | DONT) => State::Option,
                (State::Command, SB) => State::Sub,
                // NOP, AYT, GA and friends carry no option.
                (State::Command | State::Option, _) => State::Data,
                (State::Sub, IAC) => State::SubIac,
                (State::SubIac, SE) => State::Data,
                (State::Sub | State::SubIac, _) => State::Sub,
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter(input: &[u8]) -> Vec<u8> {
        TelnetFilter::new().filter(input)
    }

    #[test]
    fn plain_data_passes() {
        assert_eq!(filter(b"hello\x1b[A"), b"hello\x1b[A");
    }

    #[test]
    fn negotiation_replies_removed() {
        let input = [b'a', IAC, DO, ECHO, IAC, WILL, SUPPRESS_GO_AHEAD, b'b', IAC, WONT, LINEMODE];
        assert_eq!(filter(&input), b"ab");
    }

    #[test]
    fn two_byte_commands_removed() {
        assert_eq!(filter(&[b'x', IAC, NOP, b'y']), b"xy");
    }

    #[test]
    fn subnegotiation_removed() {
        // NAWS 80x24
        let input = [b'a', IAC, SB, 31, 0, 80, 0, 24, IAC, SE, b'b'];
        assert_eq!(filter(&input), b"ab");
    }

    #[test]
    fn escaped_iac_inside_subnegotiation() {
        let input = [IAC, SB, 31, 0, IAC, IAC, 0, 24, IAC, SE, b'z'];
        assert_eq!(filter(&input), b"z");
    }

    #[test]
    fn escaped_iac_is_data() {
        assert_eq!(filter(&[IAC, IAC]), [IAC]);
    }

    #[test]
    fn command_split_across_reads() {
        let mut f = TelnetFilter::new();
        assert_eq!(f.filter(&[b'a', IAC]), b"a");
        assert_eq!(f.filter(&[DO]), b"");
        assert_eq!(f.filter(&[ECHO, b'b']), b"b");
        assert_eq!(f.filter(&[IAC, SB, 24, 0]), b"");
        assert_eq!(f.filter(b"xterm"), b"");
        assert_eq!(f.filter(&[IAC, SE, b'c']), b"c");
    }

    #[test]
    fn line_endings_fold_to_cr() {
        assert_eq!(filter(b"a\r\nb\r\0c\rd"), b"a\rb\rc\rd");
    }

    #[test]
    fn cr_lf_split_across_reads() {
        let mut f = TelnetFilter::new();
        assert_eq!(f.filter(b"a\r"), b"a\r");
        assert_eq!(f.filter(b"\nb"), b"b");
    }

    #[test]
    fn cr_before_iac() {
        assert_eq!(filter(&[b'\r', IAC, NOP, b'x']), b"\rx");
    }
}
