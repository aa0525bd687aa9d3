use crate::number::{self, Radix};
use thiserror::Error;

/// Largest slave address accepted by the explicit `W`/`R` forms (10-bit).
pub const MAX_ADDRESS: u64 = 0x3ff;
/// Largest value accepted by the implicit `(addr << 1) | rdwr` form.
pub const MAX_ADDRESS_BYTE: u64 = 0xff;

const SPACES: &[char] = &[' ', '\t', '\r', '\n'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nop,
    Section { name: String },
    End,
    Bus { path: String },
    Delay { micros: i64 },
    Write { address: u16, payload: Vec<u8> },
    Read { address: u16, payload: Vec<u8> },
}

impl Command {
    fn into_payload(self) -> Option<Vec<u8>> {
        match self {
            Command::Write { payload, .. } | Command::Read { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid data at {offset}")]
    InvalidData { offset: usize },
    #[error("no data")]
    NoData,
    #[error("unrecognized command")]
    Unrecognized,
}

/// A line that could not be turned into a command. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}: {kind}: {text}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
    pub text: String,
}

/// Turns script lines into [`Command`]s.
///
/// The parser owns the last command it produced. The byte buffer behind a
/// `Write`/`Read` payload is reclaimed on the next call and refilled, so its
/// capacity only ever grows across a run.
#[derive(Debug)]
pub struct ScriptParser {
    command: Command,
    payload: Vec<u8>,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self {
            command: Command::Nop,
            payload: Vec::new(),
        }
    }

    /// Parse one line. `line_no` is 1-based and only used for error reports.
    pub fn parse_line(&mut self, line: &str, line_no: usize) -> Result<&Command, ParseError> {
        self.reclaim_payload();

        match self.classify(line) {
            Ok(command) => {
                self.command = command;
                Ok(&self.command)
            }
            Err(kind) => Err(ParseError {
                line: line_no,
                kind,
                text: line.trim_end_matches(['\r', '\n']).to_owned(),
            }),
        }
    }

    /// The most recently parsed command (`Nop` after a failed line).
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Capacity of the reusable payload buffer, wherever it currently lives.
    pub fn payload_capacity(&self) -> usize {
        match &self.command {
            Command::Write { payload, .. } | Command::Read { payload, .. } => payload.capacity(),
            _ => self.payload.capacity(),
        }
    }

    fn reclaim_payload(&mut self) {
        let previous = std::mem::replace(&mut self.command, Command::Nop);
        if let Some(payload) = previous.into_payload() {
            self.payload = payload;
        }
        self.payload.clear();
    }

    fn classify(&mut self, line: &str) -> Result<Command, ParseErrorKind> {
        let s = line.trim_start_matches(SPACES);

        if at_comment(s) || at_eol(s) {
            return Ok(Command::Nop);
        }

        if let Some(rest) = s.strip_prefix(':') {
            return Ok(Command::Section {
                name: rest.trim_matches(SPACES).to_owned(),
            });
        }

        if let Some(rest) = strip_keyword_ignore_case(s, "end") {
            if at_eol(rest) || at_comment(rest) || at_space(rest) {
                return Ok(Command::End);
            }
        }

        if let Some(rest) = s.strip_prefix("bus") {
            if at_space(rest) {
                return Ok(Command::Bus {
                    path: rest.trim_matches(SPACES).to_owned(),
                });
            }
        }

        if let Some(rest) = s.strip_prefix("delay") {
            if at_space(rest) {
                return Ok(Command::Delay {
                    micros: parse_delay(rest.trim_matches(SPACES)),
                });
            }
        }

        if let Some(rest) = s.strip_prefix('W') {
            let (address, payload) = self.parse_transfer(rest.trim_matches(SPACES))?;
            return Ok(Command::Write { address, payload });
        }

        if let Some(rest) = s.strip_prefix('R') {
            let (address, payload) = self.parse_transfer(rest.trim_matches(SPACES))?;
            return Ok(Command::Read { address, payload });
        }

        if s.as_bytes().first().is_some_and(u8::is_ascii_hexdigit) {
            return self.parse_implicit(s);
        }

        Err(ParseErrorKind::Unrecognized)
    }

    /// `<addr> <byte> [<byte>...]` after a `W` or `R` marker.
    fn parse_transfer(&mut self, s: &str) -> Result<(u16, Vec<u8>), ParseErrorKind> {
        let (address, rest) = match number::parse_unsigned(s, Radix::Hex) {
            Some((v, rest)) if (1..=MAX_ADDRESS).contains(&v) => (v, rest),
            _ => return Err(ParseErrorKind::InvalidAddress),
        };
        let address = u16::try_from(address).map_err(|_| ParseErrorKind::InvalidAddress)?;

        self.payload.reserve(rest.len() / 2);
        parse_bytes(rest, &mut self.payload)?;
        Ok((address, std::mem::take(&mut self.payload)))
    }

    /// `<(addr << 1) | rdwr> <byte> [<byte>...]`; an odd first token reads.
    fn parse_implicit(&mut self, s: &str) -> Result<Command, ParseErrorKind> {
        let (value, rest) = match number::parse_unsigned(s, Radix::Hex) {
            Some((v, rest)) if v <= MAX_ADDRESS_BYTE => (v, rest),
            _ => return Err(ParseErrorKind::InvalidAddress),
        };
        let address = u16::try_from(value >> 1).map_err(|_| ParseErrorKind::InvalidAddress)?;

        self.payload.reserve(rest.len() / 2);
        parse_bytes(rest, &mut self.payload)?;
        let payload = std::mem::take(&mut self.payload);

        Ok(if value & 1 == 1 {
            Command::Read { address, payload }
        } else {
            Command::Write { address, payload }
        })
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whitespace-separated data bytes up to end of line or a trailing comment.
fn parse_bytes(s: &str, out: &mut Vec<u8>) -> Result<(), ParseErrorKind> {
    let mut cursor = s;

    while !at_eol(cursor) {
        cursor = cursor.trim_start_matches(SPACES);
        if cursor.is_empty() || at_comment(cursor) {
            break;
        }

        let offset = s.len() - cursor.len();
        let invalid = ParseErrorKind::InvalidData { offset };
        let (value, rest) = number::parse_unsigned(cursor, Radix::Hex).ok_or(invalid)?;
        let byte = u8::try_from(value).map_err(|_| invalid)?;
        out.push(byte);
        cursor = rest;
    }

    if out.is_empty() {
        return Err(ParseErrorKind::NoData);
    }
    Ok(())
}

/// Delay literal with optional unit suffix, in microseconds. The unit
/// defaults to milliseconds; an unparsable number counts as zero.
fn parse_delay(s: &str) -> i64 {
    let (radix, digits) = number::split_prefix(s);
    let (value, rest) =
        number::scan_signed(digits, radix.unwrap_or(Radix::Auto)).unwrap_or((0, digits));

    match rest.as_bytes().first() {
        Some(b'u') => value,
        None | Some(b'\t' | b' ' | b'\r' | b'\n' | b';' | b'#' | b'm') => {
            value.saturating_mul(1_000)
        }
        Some(b's') => value.saturating_mul(1_000_000),
        Some(_) => value,
    }
}

fn strip_keyword_ignore_case<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let head = s.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(&s[keyword.len()..])
    } else {
        None
    }
}

fn at_comment(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b';' | b'#'))
}

fn at_space(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b' ' | b'\t' | b'\r' | b'\n'))
}

fn at_eol(s: &str) -> bool {
    matches!(s.as_bytes().first(), None | Some(b'\r' | b'\n'))
}
