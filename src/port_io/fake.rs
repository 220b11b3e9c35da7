use std::collections::HashMap;
use std::io;

use super::{PortIo, PortIoError};

#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Acquire(u16),
    Read(u16),
    Write(u16, u8),
}

/// In-memory register file standing in for the hardware
#[derive(Debug, Default)]
pub struct FakePort {
    registers: HashMap<u16, u8>,
    acquired: Vec<u16>,
    deny: bool,
    stuck: bool,
    pub log: Vec<Access>,
}

impl FakePort {
    pub fn with_register(address: u16, value: u8) -> Self {
        let mut port = FakePort::default();
        port.registers.insert(address, value);
        port
    }

    /// Every acquire fails with EPERM
    pub fn denied() -> Self {
        FakePort {
            deny: true,
            ..FakePort::default()
        }
    }

    /// Writes are accepted but the register keeps its value
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    pub fn register(&self, address: u16) -> u8 {
        self.registers.get(&address).copied().unwrap_or(0xFF)
    }

    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.log
            .iter()
            .filter_map(|access| match access {
                Access::Write(address, value) => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }

    fn check(&self, address: u16) -> Result<(), PortIoError> {
        if self.acquired.contains(&address) {
            Ok(())
        } else {
            Err(PortIoError::NotAcquired { address })
        }
    }
}

impl PortIo for FakePort {
    fn acquire(&mut self, address: u16) -> Result<(), PortIoError> {
        self.log.push(Access::Acquire(address));
        if self.deny {
            return Err(PortIoError::Permission {
                address,
                source: io::Error::from_raw_os_error(1),
            });
        }
        self.acquired.push(address);
        Ok(())
    }

    fn read(&mut self, address: u16) -> Result<u8, PortIoError> {
        self.check(address)?;
        self.log.push(Access::Read(address));
        Ok(self.register(address))
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), PortIoError> {
        self.check(address)?;
        self.log.push(Access::Write(address, value));
        if !self.stuck {
            self.registers.insert(address, value);
        }
        Ok(())
    }
}
