use log::{debug, info, warn};

use crate::config::{ControlLine, LineState, Settings};
use crate::mcr::{self, Signal};
use crate::port_io::{PortIo, PortIoError};
use crate::port_map;

/// Outcome of one read-modify-write of the MCR
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub address: u16,
    pub line: ControlLine,
    pub state: LineState,
    /// Register value before the write
    pub before: u8,
    pub written: u8,
    /// Register value read back after the write
    pub after: u8,
}

impl Report {
    /// Console lines describing the change, in the order they are printed
    pub fn summary(&self, verbose: bool) -> Vec<String> {
        let signals = self.line.signals();
        let mut lines = Vec::new();

        for signal in signals {
            lines.push(format!(
                "PTT ({}) was: {}",
                signal.name(),
                on_off(signal.is_on(self.before))
            ));
        }

        if verbose {
            lines.push(format!(
                "MCR 0x{:04X}: 0x{:02X} -> 0x{:02X} (read back 0x{:02X})",
                self.address, self.before, self.written, self.after
            ));
            for signal in Signal::ALL {
                if signals.contains(&signal) {
                    lines.push(format!("Desired Value: {} {}", signal.name(), self.state));
                } else {
                    lines.push(format!("Desired Value: {} NOT CHANGED", signal.name()));
                }
            }
        }

        for signal in signals {
            lines.push(format!(
                "PTT now: {} {}!",
                signal.name(),
                on_off(signal.is_on(self.after))
            ));
        }

        lines
    }

    /// Whether every controlled line reads back in the requested state
    pub fn confirmed(&self) -> bool {
        let want_on = self.state == LineState::On;
        self.line
            .signals()
            .iter()
            .all(|signal| signal.is_on(self.after) == want_on)
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Drive the configured control line: acquire, read, compute, write, verify.
/// Nothing touches the register unless permission is granted first.
pub fn key_line<P: PortIo + ?Sized>(io: &mut P, settings: &Settings) -> Result<Report, PortIoError> {
    let base = port_map::base_address(settings.port);
    let address = port_map::mcr_address(settings.port);

    info!("COMM port base address: 0x{:04X}", base);
    info!("COMM port MCR register address: 0x{:04X}", address);
    info!("ptt mode is {}", settings.line);

    io.acquire(address)?;

    let before = io.read(address)?;
    info!("Initial value: 0x{:02X}", before);

    if mcr::uart_absent(before) {
        warn!(
            "MCR initial value 0x{:02X} indicates no UART present at 0x{:04X}",
            before, address
        );
    }

    let written = mcr::compute_new_value(before, settings.line, settings.state, settings.write_mask);
    info!("New value: 0x{:02X}", written);

    io.write(address, written)?;

    let after = io.read(address)?;
    info!("Read back: 0x{:02X}", after);

    let report = Report {
        address,
        line: settings.line,
        state: settings.state,
        before,
        written,
        after,
    };

    if !report.confirmed() {
        warn!(
            "{} did not read back {} (wrote 0x{:02X}, read 0x{:02X})",
            settings.line, settings.state, written, after
        );
    }
    debug!("{:?}", report);

    Ok(report)
}
