use crate::device::{BusDevice, BusOpener};
use crate::protocol::Command;
use crate::transcript::Transcript;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bus used until a `bus` line replaces it.
    pub bus: Option<String>,
    /// Applied right after every successful open; zero leaves the kernel default.
    pub timeout: u32,
    /// Select slave addresses with `I2C_SLAVE_FORCE`.
    pub force: bool,
    /// When set, only sections whose name contains it reach the bus.
    pub section_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No I2C bus specified")]
    NoBus,
    #[error("{bus}: {source}")]
    Open { bus: String, source: io::Error },
    #[error("{bus}: timeout {timeout}: {source}")]
    Timeout {
        bus: String,
        timeout: u32,
        source: io::Error,
    },
    #[error("{bus}: setting slave address 0x{address:x}: {source}")]
    SelectAddress {
        bus: String,
        address: u16,
        source: io::Error,
    },
    #[error("i2c: write slave 0x{address:x}: {source}")]
    Write { address: u16, source: io::Error },
    #[error("i2c: write slave 0x{address:x}: short write {written} of {expected}")]
    ShortWrite {
        address: u16,
        written: usize,
        expected: usize,
    },
    #[error("transcript: {0}")]
    Transcript(#[from] io::Error),
}

impl SessionError {
    /// Fatal errors end the run; the rest only abort the current transaction.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Open { .. } | SessionError::Timeout { .. } | SessionError::Transcript(_)
        )
    }
}

/// Bus state carried across the commands of one run.
///
/// The device is opened lazily by the first enabled write and closed again
/// whenever the bus changes or a section ends.
pub struct BusSession<O: BusOpener> {
    opener: O,
    bus: Option<String>,
    device: Option<O::Device>,
    timeout: u32,
    force: bool,
    section_filter: Option<String>,
    enabled: bool,
}

impl<O: BusOpener> BusSession<O> {
    pub fn new(opener: O, config: SessionConfig) -> Self {
        Self {
            opener,
            bus: config.bus,
            device: None,
            timeout: config.timeout,
            force: config.force,
            enabled: config.section_filter.is_none(),
            section_filter: config.section_filter,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub fn bus(&self) -> Option<&str> {
        self.bus.as_deref()
    }

    pub fn execute<W: Write>(
        &mut self,
        command: &Command,
        transcript: &mut Transcript<W>,
    ) -> Result<(), SessionError> {
        match command {
            Command::Nop => {}
            Command::Section { name } => {
                self.enabled = match self.section_filter.as_deref() {
                    Some(filter) => name.contains(filter),
                    None => true,
                };
                transcript.section(name, self.enabled)?;
            }
            Command::End => {
                self.enabled = false;
                self.close();
                info!("end");
            }
            Command::Bus { path } => {
                self.bus = Some(path.clone());
                self.close();
            }
            Command::Delay { micros } => {
                transcript.delay(*micros)?;
                // Bus timing, so it runs even outside enabled sections.
                thread::sleep(Duration::from_micros(u64::try_from(*micros).unwrap_or(0)));
            }
            Command::Write { address, payload } => {
                transcript.write(self.enabled, *address, payload)?;
                if self.enabled {
                    self.write(*address, payload)?;
                }
            }
            Command::Read { address, payload } => {
                transcript.read(self.enabled, *address, payload)?;
                // No read transfer is issued in any state.
            }
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.device.take().is_some() {
            tracing::debug!("closed {}", self.bus.as_deref().unwrap_or("bus"));
        }
    }

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), SessionError> {
        let device = match self.device.take() {
            Some(device) => device,
            None => self.open()?,
        };
        let device = self.device.insert(device);
        let bus = self.bus.as_deref().unwrap_or_default();

        device
            .select_address(address, self.force)
            .map_err(|source| SessionError::SelectAddress {
                bus: bus.to_owned(),
                address,
                source,
            })?;

        let written = device
            .write(payload)
            .map_err(|source| SessionError::Write { address, source })?;
        if written != payload.len() {
            return Err(SessionError::ShortWrite {
                address,
                written,
                expected: payload.len(),
            });
        }
        Ok(())
    }

    fn open(&mut self) -> Result<O::Device, SessionError> {
        let bus = self.bus.as_deref().ok_or(SessionError::NoBus)?;

        let mut device = self.opener.open(bus).map_err(|source| SessionError::Open {
            bus: bus.to_owned(),
            source,
        })?;

        if self.timeout != 0 {
            device
                .set_timeout(self.timeout)
                .map_err(|source| SessionError::Timeout {
                    bus: bus.to_owned(),
                    timeout: self.timeout,
                    source,
                })?;
        }
        Ok(device)
    }
}

impl<O: BusOpener> Drop for BusSession<O> {
    fn drop(&mut self) {
        self.close();
    }
}
