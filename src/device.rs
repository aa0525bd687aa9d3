//! I2C bus device access.
//!
//! [`BusOpener`] and [`BusDevice`] are the only points where the interpreter
//! touches hardware. [`LinuxI2c`] implements them over the `i2c-dev`
//! character devices; tests substitute their own implementations.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

// <linux/i2c-dev.h>
const I2C_TIMEOUT: u32 = 0x0702;
const I2C_SLAVE: u32 = 0x0703;
const I2C_TENBIT: u32 = 0x0704;
const I2C_SLAVE_FORCE: u32 = 0x0706;

const MAX_7BIT_ADDRESS: u16 = 0x7f;

/// An open bus handle. Dropping it closes the bus.
pub trait BusDevice {
    /// Select the slave for subsequent writes. `force` bypasses the kernel's
    /// check for addresses already claimed by a driver.
    fn select_address(&mut self, address: u16, force: bool) -> io::Result<()>;

    /// Transfer timeout, in units of 10 ms.
    fn set_timeout(&mut self, timeout: u32) -> io::Result<()>;

    /// Issue one raw write. Returns the number of bytes the bus accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;
}

pub trait BusOpener {
    type Device: BusDevice;

    fn open(&mut self, bus: &str) -> io::Result<Self::Device>;
}

/// Map a bus name to its device node: `1` is `/dev/i2c-1`, `i2c-1` is
/// `/dev/i2c-1`, and anything with a `/` is taken as a full path.
pub fn resolve_bus_path(bus: &str) -> PathBuf {
    if bus.contains('/') {
        PathBuf::from(bus)
    } else if !bus.is_empty() && bus.bytes().all(|b| b.is_ascii_digit()) {
        PathBuf::from(format!("/dev/i2c-{bus}"))
    } else {
        PathBuf::from("/dev").join(bus)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxI2c;

impl BusOpener for LinuxI2c {
    type Device = I2cDevice;

    fn open(&mut self, bus: &str) -> io::Result<I2cDevice> {
        let path = resolve_bus_path(bus);
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        tracing::debug!("opened {}", path.display());
        Ok(I2cDevice {
            file,
            ten_bit: false,
        })
    }
}

/// Ioctls that select `address` on a handle currently in `ten_bit` mode.
/// The mode is switched first, and only when the address needs it.
fn select_requests(ten_bit: bool, address: u16, force: bool) -> Vec<(u32, libc::c_ulong)> {
    let mut requests = Vec::with_capacity(2);
    let wants_ten_bit = address > MAX_7BIT_ADDRESS;
    if wants_ten_bit != ten_bit {
        requests.push((I2C_TENBIT, libc::c_ulong::from(wants_ten_bit)));
    }
    let request = if force { I2C_SLAVE_FORCE } else { I2C_SLAVE };
    requests.push((request, libc::c_ulong::from(address)));
    requests
}

#[derive(Debug)]
pub struct I2cDevice {
    file: File,
    ten_bit: bool,
}

impl I2cDevice {
    fn ioctl(&self, request: u32, arg: libc::c_ulong) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `self.file` and every request
        // used here takes its argument by value.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl BusDevice for I2cDevice {
    fn select_address(&mut self, address: u16, force: bool) -> io::Result<()> {
        for (request, arg) in select_requests(self.ten_bit, address, force) {
            self.ioctl(request, arg)?;
            if request == I2C_TENBIT {
                self.ten_bit = arg != 0;
            }
        }
        Ok(())
    }

    fn set_timeout(&mut self, timeout: u32) -> io::Result<()> {
        self.ioctl(I2C_TIMEOUT, libc::c_ulong::from(timeout))
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.file.write(bytes)
    }
}
