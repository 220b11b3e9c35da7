use std::io;
use thiserror::Error;

#[cfg(test)]
pub mod fake;
mod raw;

pub use raw::RawPort;

#[derive(Debug, Error)]
pub enum PortIoError {
    #[error("ioperm(0x{address:x}) failed")]
    Permission {
        address: u16,
        #[source]
        source: io::Error,
    },

    // Only built on targets without ioperm
    #[allow(dead_code)]
    #[error("raw port I/O at 0x{address:x} is not supported on this platform")]
    Unsupported { address: u16 },

    #[error("port 0x{address:x} used without permission")]
    NotAcquired { address: u16 },
}

/// Minimal access to the x86 I/O port space
pub trait PortIo {
    /// Ask the OS for access to a single port address
    fn acquire(&mut self, address: u16) -> Result<(), PortIoError>;

    fn read(&mut self, address: u16) -> Result<u8, PortIoError>;

    fn write(&mut self, address: u16, value: u8) -> Result<(), PortIoError>;
}
