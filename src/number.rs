//! Numeric literal recognition for script tokens.
//!
//! Literals may carry a two-character base prefix (`0x`, `0d`, `0b`, `0o`).
//! Without a prefix the caller chooses the fallback radix: hexadecimal for
//! addresses and data bytes, C-style automatic detection for delays and the
//! `-t` timeout flag.
//!
//! The `0o` recognizer consumes only the leading `0`, so the digit scan starts
//! at the `o` and an octal literal written with that prefix never yields
//! digits. Scripts relying on octal should use the bare leading-zero form in an
//! auto-radix context instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// Leading `0x` selects hex, a leading `0` selects octal, otherwise decimal.
    Auto,
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Auto => 0,
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Auto => "",
            Radix::Binary => "0b",
            Radix::Octal => "0o",
            Radix::Decimal => "0d",
            Radix::Hex => "0x",
        }
    }
}

/// Detect a base prefix and return the radix it names with the cursor moved
/// past it. Returns `None` and the input untouched when no prefix matches.
pub fn split_prefix(s: &str) -> (Option<Radix>, &str) {
    let Some(tail) = s.strip_prefix('0') else {
        return (None, s);
    };
    match tail.as_bytes().first() {
        Some(b'x') => (Some(Radix::Hex), &tail[1..]),
        Some(b'd') => (Some(Radix::Decimal), &tail[1..]),
        Some(b'b') => (Some(Radix::Binary), &tail[1..]),
        // Only the `0` is consumed here.
        Some(b'o') => (Some(Radix::Octal), tail),
        _ => (None, s),
    }
}

struct Scan<'a> {
    negative: bool,
    /// `None` when the digit run overflowed 64 bits.
    magnitude: Option<u64>,
    rest: &'a str,
}

/// `strtoul`-style scan: optional whitespace, optional sign, then the longest
/// digit run valid in `radix`.
fn scan(s: &str, radix: Radix) -> Option<Scan<'_>> {
    let bytes = s.as_bytes();
    let mut i = bytes
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .count();

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let hex_marker = bytes.get(i) == Some(&b'0')
        && matches!(bytes.get(i + 1), Some(b'x' | b'X'))
        && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);

    let mut base = radix.base();
    if (base == 0 || base == 16) && hex_marker {
        i += 2;
        base = 16;
    } else if base == 0 {
        base = if bytes.get(i) == Some(&b'0') { 8 } else { 10 };
    }

    let start = i;
    let mut value: u64 = 0;
    let mut overflow = false;
    while let Some(digit) = bytes.get(i).and_then(|&b| char::from(b).to_digit(base)) {
        match value
            .checked_mul(u64::from(base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => value = v,
            None => overflow = true,
        }
        i += 1;
    }

    if i == start {
        return None;
    }

    Some(Scan {
        negative,
        magnitude: (!overflow).then_some(value),
        rest: &s[i..],
    })
}

/// Unsigned scan in a fixed radix. Overflow saturates to `u64::MAX`; a minus
/// sign negates modulo 2^64.
pub fn scan_unsigned(s: &str, radix: Radix) -> Option<(u64, &str)> {
    let scan = scan(s, radix)?;
    let value = match scan.magnitude {
        None => u64::MAX,
        Some(m) if scan.negative => m.wrapping_neg(),
        Some(m) => m,
    };
    Some((value, scan.rest))
}

/// Signed scan in a fixed radix, clamping to the `i64` range.
pub fn scan_signed(s: &str, radix: Radix) -> Option<(i64, &str)> {
    let scan = scan(s, radix)?;
    let value = match (scan.negative, scan.magnitude) {
        (false, None) => i64::MAX,
        (true, None) => i64::MIN,
        (false, Some(m)) => i64::try_from(m).unwrap_or(i64::MAX),
        (true, Some(m)) => 0i64.checked_sub_unsigned(m).unwrap_or(i64::MIN),
    };
    Some((value, scan.rest))
}

/// Prefix detection followed by an unsigned scan. `fallback` applies when no
/// prefix is present. On failure the caller keeps its original cursor.
pub fn parse_unsigned(s: &str, fallback: Radix) -> Option<(u64, &str)> {
    let (radix, digits) = split_prefix(s);
    scan_unsigned(digits, radix.unwrap_or(fallback))
}

/// Render `value` with the prefix that selects `radix` when parsed back.
pub fn format_literal(value: u64, radix: Radix) -> String {
    match radix {
        Radix::Auto | Radix::Decimal => format!("{}{value}", radix.prefix()),
        Radix::Binary => format!("0b{value:b}"),
        Radix::Octal => format!("0o{value:o}"),
        Radix::Hex => format!("0x{value:x}"),
    }
}
