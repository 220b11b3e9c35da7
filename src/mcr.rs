use crate::config::{ControlLine, LineState, WriteMask};

pub const DTR_MASK: u8 = 0x01; // bit 0
pub const RTS_MASK: u8 = 0x02; // bit 1

/// Bits kept by a `WriteMask::ControlOnly` write
pub const CONTROL_MASK: u8 = DTR_MASK | RTS_MASK;

/// A real 8250 reads these back as zero; set means nothing is decoding the port
pub const NO_UART_MASK: u8 = 0xC0;

/// One RS-232 output driven from the MCR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Dtr,
    Rts,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::Dtr, Signal::Rts];

    pub fn mask(self) -> u8 {
        match self {
            Signal::Dtr => DTR_MASK,
            Signal::Rts => RTS_MASK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::Dtr => "DTR",
            Signal::Rts => "RTS",
        }
    }

    pub fn is_on(self, register: u8) -> bool {
        register & self.mask() == self.mask()
    }
}

/// Compute the MCR byte that drives `line` to `state`
pub fn compute_new_value(current: u8, line: ControlLine, state: LineState, mask: WriteMask) -> u8 {
    let bits = line.mask();

    let value = match state {
        LineState::On => current | bits,
        LineState::Off => current & !bits,
    };

    match mask {
        WriteMask::ControlOnly => value & CONTROL_MASK,
        WriteMask::Preserve => value,
    }
}

pub fn uart_absent(register: u8) -> bool {
    register & NO_UART_MASK != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_on_clears_upper_bits() {
        for current in [0x00, 0x03, 0x1C, 0xFF, 0xA5] {
            let value =
                compute_new_value(current, ControlLine::Both, LineState::On, WriteMask::ControlOnly);
            assert_eq!(value, 0x03, "from {:#04x}", current);
        }
    }

    #[test]
    fn test_both_off() {
        let value = compute_new_value(0x03, ControlLine::Both, LineState::Off, WriteMask::ControlOnly);
        assert_eq!(value, 0x00);
    }

    #[test]
    fn test_dtr_off_keeps_rts() {
        let value = compute_new_value(0x03, ControlLine::Dtr, LineState::Off, WriteMask::ControlOnly);
        assert_eq!(value, 0x02);
    }

    #[test]
    fn test_rts_on_keeps_dtr() {
        assert_eq!(
            compute_new_value(0x01, ControlLine::Rts, LineState::On, WriteMask::ControlOnly),
            0x03
        );
        assert_eq!(
            compute_new_value(0x00, ControlLine::Rts, LineState::On, WriteMask::ControlOnly),
            0x02
        );
    }

    #[test]
    fn test_none_leaves_control_bits() {
        let value = compute_new_value(0x0A, ControlLine::None, LineState::On, WriteMask::ControlOnly);
        assert_eq!(value, 0x02);
    }

    #[test]
    fn test_preserve_keeps_loopback_and_out2() {
        // 0x18 is LOOP | OUT2
        let value = compute_new_value(0x18, ControlLine::Dtr, LineState::On, WriteMask::Preserve);
        assert_eq!(value, 0x19);

        let value = compute_new_value(0x1B, ControlLine::Both, LineState::Off, WriteMask::Preserve);
        assert_eq!(value, 0x18);
    }

    #[test]
    fn test_signal_state() {
        assert!(Signal::Dtr.is_on(0x01));
        assert!(!Signal::Rts.is_on(0x01));
        assert!(Signal::Rts.is_on(0xFE));
    }

    #[test]
    fn test_uart_absent() {
        assert!(uart_absent(0xFF));
        assert!(uart_absent(0x40));
        assert!(!uart_absent(0x3F));
    }
}
