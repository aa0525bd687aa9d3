#![allow(dead_code)]

use i2cscript::runner::Interpreter;
use i2cscript::session::{BusSession, SessionConfig};
use i2cscript::transcript::{OutputFormat, Transcript};
use i2cscript::{BusDevice, BusOpener};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Open(String),
    Timeout(u32),
    Select { address: u16, force: bool },
    Write(Vec<u8>),
    Close,
}

/// Records every device call so tests can assert on bus traffic.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    pub events: Rc<RefCell<Vec<BusEvent>>>,
    pub fail_open: bool,
    pub fail_timeout: bool,
    pub fail_select: bool,
    pub fail_write: bool,
    pub short_write: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.events.borrow().clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct MockDevice {
    bus: MockBus,
}

impl BusOpener for MockBus {
    type Device = MockDevice;

    fn open(&mut self, bus: &str) -> io::Result<MockDevice> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
        }
        self.events.borrow_mut().push(BusEvent::Open(bus.to_owned()));
        Ok(MockDevice { bus: self.clone() })
    }
}

impl BusDevice for MockDevice {
    fn select_address(&mut self, address: u16, force: bool) -> io::Result<()> {
        if self.bus.fail_select {
            return Err(io::Error::new(io::ErrorKind::Other, "Device or resource busy"));
        }
        self.bus.events.borrow_mut().push(BusEvent::Select { address, force });
        Ok(())
    }

    fn set_timeout(&mut self, timeout: u32) -> io::Result<()> {
        if self.bus.fail_timeout {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Invalid argument"));
        }
        self.bus.events.borrow_mut().push(BusEvent::Timeout(timeout));
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.bus.fail_write {
            return Err(io::Error::new(io::ErrorKind::Other, "Remote I/O error"));
        }
        self.bus.events.borrow_mut().push(BusEvent::Write(bytes.to_vec()));
        Ok(self.bus.short_write.unwrap_or(bytes.len()))
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.bus.events.borrow_mut().push(BusEvent::Close);
    }
}

pub fn session(bus: &MockBus, config: SessionConfig) -> BusSession<MockBus> {
    BusSession::new(bus.clone(), config)
}

pub fn interpreter(bus: &MockBus, config: SessionConfig) -> Interpreter<MockBus, Vec<u8>> {
    Interpreter::new(session(bus, config), Transcript::new(Vec::new(), OutputFormat::Text))
}

pub fn transcript_text(interpreter: &Interpreter<MockBus, Vec<u8>>) -> String {
    String::from_utf8(interpreter.transcript().get_ref().clone()).unwrap()
}

pub fn with_bus(bus: &str) -> SessionConfig {
    SessionConfig {
        bus: Some(bus.to_owned()),
        ..SessionConfig::default()
    }
}
