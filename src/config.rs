//! Command-line configuration.
//!
//! ```text
//! i2cscript [-h] [-f] [-t <timeout>] [-d <bus>] [-s <section-search>] [--format text|json] <cmd-file>
//! ```

use crate::number::{self, Radix};
use crate::session::SessionConfig;
use crate::transcript::OutputFormat;
use clap::{App, AppSettings, Arg};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub bus: Option<String>,
    pub timeout: u32,
    pub force: bool,
    pub section_filter: Option<String>,
    pub format: OutputFormat,
    pub script: ScriptSource,
}

/// Every variant ends the process with the usage exit status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("help requested")]
    Help,
    #[error("missing <cmd-file>")]
    MissingScript,
    #[error("invalid timeout '{0}'")]
    InvalidTimeout(String),
    #[error("{0}")]
    Invalid(String),
}

impl RunConfig {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app()
            .get_matches_from_safe(args)
            .map_err(|e| ConfigError::Invalid(e.message))?;

        if matches.is_present("help") {
            return Err(ConfigError::Help);
        }

        let script = match matches.value_of("script") {
            None => return Err(ConfigError::MissingScript),
            Some("-") => ScriptSource::Stdin,
            Some(path) => ScriptSource::File(PathBuf::from(path)),
        };

        let timeout = match matches.value_of("timeout") {
            None => 0,
            Some(raw) => {
                parse_timeout(raw).ok_or_else(|| ConfigError::InvalidTimeout(raw.to_owned()))?
            }
        };

        let format = matches
            .value_of("format")
            .unwrap_or("text")
            .parse::<OutputFormat>()
            .map_err(ConfigError::Invalid)?;

        Ok(Self {
            bus: matches.value_of("device").map(str::to_owned),
            timeout,
            force: matches.is_present("force"),
            section_filter: matches.value_of("search").map(str::to_owned),
            format,
            script,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bus: self.bus.clone(),
            timeout: self.timeout,
            force: self.force,
            section_filter: self.section_filter.clone(),
        }
    }
}

/// Auto-radix literal (`16`, `0x10`, `020`) that fits the ioctl argument.
fn parse_timeout(raw: &str) -> Option<u32> {
    let (value, rest) = number::scan_unsigned(raw, Radix::Auto)?;
    if !rest.trim().is_empty() {
        return None;
    }
    u32::try_from(value).ok()
}

fn app() -> App<'static, 'static> {
    App::new("i2cscript")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run I2C command scripts against a Linux i2c-dev bus")
        .setting(AppSettings::DisableHelpFlags)
        .setting(AppSettings::DisableVersion)
        .arg(Arg::with_name("help").short("h").help("Show usage information"))
        .arg(
            Arg::with_name("force")
                .short("f")
                .help("Force use of the slave addresses (dangerous!)"),
        )
        .arg(
            Arg::with_name("timeout")
                .short("t")
                .value_name("TIMEOUT")
                .takes_value(true)
                .help("Bus timeout in units of 10 ms"),
        )
        .arg(
            Arg::with_name("device")
                .short("d")
                .value_name("BUS")
                .takes_value(true)
                .help("Use this I2C bus (number, name or full path)"),
        )
        .arg(
            Arg::with_name("search")
                .short("s")
                .value_name("SECTION")
                .takes_value(true)
                .help("Only run sections whose name contains this text"),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .value_name("FORMAT")
                .takes_value(true)
                .possible_values(&["text", "json"])
                .help("Transcript format"),
        )
        .arg(
            Arg::with_name("script")
                .value_name("CMD-FILE")
                .index(1)
                .help("File to process for I2C commands, '-' for stdin"),
        )
}

pub fn usage(program: &str) -> String {
    format!(
        "{program} [-h] [-f] [-t <i2c-timeout>] [-d <i2c-bus-name-or-full-path>] [-s <section-search>] [--format text|json] <cmd-file>
-h\t\tShow usage information
-f\t\tForce use of the slave addresses (dangerous!)
-t <timeout>\tBus timeout, in units of 10 ms
-d <path>\tUse this I2C bus
-s <search>\tOnly access the bus inside sections whose name contains <search>
--format <fmt>\tTranscript format, text (default) or json
<cmd-file>\tFile to process for I2C commands, '-' for standard input

<cmd-file> has following format:

: section-name
# commentary
; commentary
[ bus <i2c-bus-name-or-full-path> ]
delay <delay>[(ms|us|s)] [ (#|;) pause, ms by default ]
W <addr> <byte> [<byte>...]   [ (#|;) write command commentary ]
R <addr> <byte> [<byte>...]   [ (#|;) read command commentary ]
<addr << 1 | rdwr> byte0 [bytes...]   [ (#|;) read/write command commentary ]
(End | end) [ (#|;) end of section commentary ]
<addr> and <byte> are expected in hexadecimal, 0b (binary), 0d (decimal)
and 0x (hex) prefixes supported; <delay> is decimal unless prefixed, with a
leading 0 meaning octal
"
    )
}
