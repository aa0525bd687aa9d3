//! # I2C Script Interpreter
//!
//! Runs line-oriented command scripts against a Linux `i2c-dev` bus: select a
//! bus, pause, and write byte sequences to 7- or 10-bit slave addresses.
//! Commands can be grouped into named sections and a substring filter decides
//! which sections actually reach the hardware; everything else is logged as a
//! dry run.
//!
//! ## Quick Start
//!
//! ```rust
//! use i2cscript::{Command, ScriptParser};
//!
//! let mut parser = ScriptParser::new();
//!
//! let command = parser.parse_line("W 0x50 01 02 ; set pointer", 1).unwrap();
//! assert_eq!(*command, Command::Write { address: 0x50, payload: vec![0x01, 0x02] });
//!
//! // Implicit form: odd first byte reads from (0x41 >> 1).
//! let command = parser.parse_line("41 01", 2).unwrap();
//! assert_eq!(*command, Command::Read { address: 0x20, payload: vec![0x01] });
//! ```
//!
//! ## Architecture
//!
//! - [`number`] - Numeric literals with base prefixes
//! - [`protocol`] - Command model and line parser
//! - [`session`] - Bus session state and command execution
//! - [`device`] - Bus device seam and the Linux implementation
//! - [`transcript`] - Text/JSON record of executed commands
//! - [`runner`] - Line loop tying parser and session together
//! - [`config`] - Command-line options
//! - [`logging`] - Diagnostic output setup

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod device;
pub mod logging;
pub mod number;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod transcript;

// Re-export main public types for convenience
pub use device::{BusDevice, BusOpener, LinuxI2c};
pub use protocol::{Command, ParseError, ScriptParser};
pub use runner::{Interpreter, RunStats};
pub use session::{BusSession, SessionConfig, SessionError};
pub use transcript::{OutputFormat, Transcript};
