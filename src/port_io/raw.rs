use log::{debug, warn};

use super::{PortIo, PortIoError};

/// Direct `in`/`out` access to the I/O port space, gated by `ioperm(2)`.
/// Permission is handed back when the port is dropped.
#[derive(Debug, Default)]
pub struct RawPort {
    granted: Vec<u16>,
}

impl RawPort {
    pub fn new() -> Self {
        RawPort::default()
    }

    fn check(&self, address: u16) -> Result<(), PortIoError> {
        if self.granted.contains(&address) {
            Ok(())
        } else {
            Err(PortIoError::NotAcquired { address })
        }
    }
}

impl PortIo for RawPort {
    fn acquire(&mut self, address: u16) -> Result<(), PortIoError> {
        sys::ioperm(address, true)?;
        debug!("ioperm granted for 0x{:04x}", address);
        self.granted.push(address);
        Ok(())
    }

    fn read(&mut self, address: u16) -> Result<u8, PortIoError> {
        self.check(address)?;
        // SAFETY: ioperm succeeded for this address
        Ok(unsafe { sys::inb(address) })
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), PortIoError> {
        self.check(address)?;
        // SAFETY: ioperm succeeded for this address
        unsafe { sys::outb(address, value) };
        Ok(())
    }
}

impl Drop for RawPort {
    fn drop(&mut self) {
        for address in self.granted.drain(..) {
            if let Err(e) = sys::ioperm(address, false) {
                warn!("Failed to release port 0x{:04x}: {}", address, e);
            }
        }
    }
}

#[cfg(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
))]
mod sys {
    use std::io;

    use crate::port_io::PortIoError;

    pub fn ioperm(address: u16, enable: bool) -> Result<(), PortIoError> {
        let rc = unsafe { libc::ioperm(libc::c_ulong::from(address), 1, libc::c_int::from(enable)) };
        if rc == 0 {
            Ok(())
        } else {
            Err(PortIoError::Permission {
                address,
                source: io::Error::last_os_error(),
            })
        }
    }

    pub unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        core::arch::asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
        value
    }

    pub unsafe fn outb(port: u16, value: u8) {
        core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
    }
}

#[cfg(not(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
)))]
mod sys {
    use crate::port_io::PortIoError;

    pub fn ioperm(address: u16, _enable: bool) -> Result<(), PortIoError> {
        Err(PortIoError::Unsupported { address })
    }

    // Unreachable: acquire never succeeds on these targets
    pub unsafe fn inb(_port: u16) -> u8 {
        0xFF
    }

    pub unsafe fn outb(_port: u16, _value: u8) {}
}
