use crate::number::{format_literal, Radix};
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per event, `i2c` tool style.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Section {
        name: &'a str,
        entered: bool,
    },
    Delay {
        micros: i64,
    },
    Write {
        enabled: bool,
        address: u16,
        wire_address: u16,
        payload: &'a [u8],
    },
    Read {
        enabled: bool,
        address: u16,
        wire_address: u16,
        payload: &'a [u8],
    },
}

/// Record of every section, delay and transfer the interpreter processes,
/// whether or not it reached the bus.
#[derive(Debug)]
pub struct Transcript<W: Write> {
    out: W,
    format: OutputFormat,
    line: String,
}

impl<W: Write> Transcript<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            line: String::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn section(&mut self, name: &str, entered: bool) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                let ignored = if entered { "" } else { " ignored" };
                writeln!(self.out, "# Section{ignored} {name}")
            }
            OutputFormat::Json => self.emit(&Event::Section { name, entered }),
        }
    }

    pub fn delay(&mut self, micros: i64) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "delay {micros}us"),
            OutputFormat::Json => self.emit(&Event::Delay { micros }),
        }
    }

    /// `W 0x50 01 02 # A0`, lower-case marker when the write stays off the bus.
    pub fn write(&mut self, enabled: bool, address: u16, payload: &[u8]) -> io::Result<()> {
        let wire_address = address << 1;
        if self.format == OutputFormat::Json {
            return self.emit(&Event::Write {
                enabled,
                address,
                wire_address,
                payload,
            });
        }

        self.line.clear();
        self.line.push(if enabled { 'W' } else { 'w' });
        self.line.push(' ');
        self.line.push_str(&format_literal(u64::from(address), Radix::Hex));
        push_bytes(&mut self.line, payload);
        self.line.push_str(&format!(" # {wire_address:02X}"));
        writeln!(self.out, "{}", self.line)
    }

    /// `R 0x20: @41 01`, framed with the 8-bit read address.
    pub fn read(&mut self, enabled: bool, address: u16, payload: &[u8]) -> io::Result<()> {
        let wire_address = (address << 1) | 1;
        if self.format == OutputFormat::Json {
            return self.emit(&Event::Read {
                enabled,
                address,
                wire_address,
                payload,
            });
        }

        self.line.clear();
        self.line.push(if enabled { 'R' } else { 'r' });
        self.line.push(' ');
        self.line.push_str(&format_literal(u64::from(address), Radix::Hex));
        self.line.push_str(&format!(": @{wire_address:02X}"));
        push_bytes(&mut self.line, payload);
        writeln!(self.out, "{}", self.line)
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")
    }
}

fn push_bytes(line: &mut String, payload: &[u8]) {
    for byte in payload {
        line.push_str(&format!(" {byte:02X}"));
    }
}
