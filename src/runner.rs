use crate::device::BusOpener;
use crate::protocol::{Command, ScriptParser};
use crate::session::{BusSession, SessionError};
use crate::transcript::Transcript;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_FATAL: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines: usize,
    pub commands: usize,
    pub parse_errors: usize,
    pub transaction_errors: usize,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fatal(#[from] SessionError),
    #[error("reading script: {0}")]
    Input(io::Error),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        EXIT_FATAL
    }
}

/// Drives a script through the parser and the bus session, one line at a
/// time, until end of input or a fatal bus error.
pub struct Interpreter<O: BusOpener, W: Write> {
    parser: ScriptParser,
    session: BusSession<O>,
    transcript: Transcript<W>,
    stats: RunStats,
    no_bus_reported: bool,
}

impl<O: BusOpener, W: Write> Interpreter<O, W> {
    pub fn new(session: BusSession<O>, transcript: Transcript<W>) -> Self {
        Self {
            parser: ScriptParser::new(),
            session,
            transcript,
            stats: RunStats::default(),
            no_bus_reported: false,
        }
    }

    pub fn session(&self) -> &BusSession<O> {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript<W> {
        &self.transcript
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<RunStats, RunError> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = input.read_until(b'\n', &mut raw).map_err(RunError::Input)?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            self.process_line(&line)?;
        }

        self.transcript.flush().map_err(SessionError::Transcript)?;
        debug!(
            "{} lines, {} commands, {} parse errors, {} transaction errors",
            self.stats.lines,
            self.stats.commands,
            self.stats.parse_errors,
            self.stats.transaction_errors
        );
        Ok(self.stats)
    }

    /// Parse and execute one line. Parse errors and failed transactions are
    /// logged and counted; only fatal errors are returned.
    pub fn process_line(&mut self, line: &str) -> Result<(), RunError> {
        self.stats.lines += 1;

        let command = match self.parser.parse_line(line, self.stats.lines) {
            Ok(command) => command,
            Err(e) => {
                warn!("{e}");
                self.stats.parse_errors += 1;
                return Ok(());
            }
        };

        if !matches!(command, Command::Nop) {
            self.stats.commands += 1;
        }
        match self.session.execute(command, &mut self.transcript) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(RunError::Fatal(e)),
            Err(SessionError::NoBus) => {
                self.stats.transaction_errors += 1;
                if !self.no_bus_reported {
                    warn!("{}", SessionError::NoBus);
                    self.no_bus_reported = true;
                }
                Ok(())
            }
            Err(e) => {
                self.stats.transaction_errors += 1;
                warn!("{e}");
                Ok(())
            }
        }
    }
}
