/// Offset of the Modem Control Register from the UART base address
pub const MCR_OFFSET: u32 = 0x04;

/// Keeps the computed address inside the 16-bit x86 I/O space
pub const IO_MASK: u32 = 0xFFFF;

/// Legacy COM base addresses, indexed by logical port number
const BASE_ADDRESSES: [u16; 8] = [
    0x3F8,  // COM1
    0x2F8,  // COM2
    0x3E8,  // COM3
    0x2E8,  // COM4
    0xEC98, // PCI add-in cards from here on
    0xDCC0,
    0xDCC8,
    0xDCD0,
];

const DEVICE_NAMES: [&str; 8] = [
    "/dev/ttyS0",
    "/dev/ttyS1",
    "/dev/ttyS2",
    "/dev/ttyS3",
    "/dev/ttyS4",
    "/dev/ttyS5",
    "/dev/ttyS6",
    "/dev/ttyS7",
];

/// Map a serial device path to its logical port number
pub fn port_for_device(device: &str) -> Option<i64> {
    DEVICE_NAMES
        .iter()
        .position(|name| *name == device)
        .map(|index| index as i64)
}

/// Device path for a logical port, if it has one
pub fn device_for_port(port: i64) -> Option<&'static str> {
    usize::try_from(port)
        .ok()
        .and_then(|index| DEVICE_NAMES.get(index))
        .copied()
}

/// Whether the port number has an entry in the address table
pub fn is_known_port(port: i64) -> bool {
    usize::try_from(port).map_or(false, |index| index < BASE_ADDRESSES.len())
}

/// UART base address for a logical port. Unknown ports use COM1's address.
pub fn base_address(port: i64) -> u16 {
    usize::try_from(port)
        .ok()
        .and_then(|index| BASE_ADDRESSES.get(index))
        .copied()
        .unwrap_or(BASE_ADDRESSES[0])
}

/// I/O address of the Modem Control Register for a logical port
pub fn mcr_address(port: i64) -> u16 {
    ((u32::from(base_address(port)) + MCR_OFFSET) & IO_MASK) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_com_addresses() {
        assert_eq!(base_address(0), 0x3F8);
        assert_eq!(base_address(1), 0x2F8);
        assert_eq!(base_address(2), 0x3E8);
        assert_eq!(base_address(3), 0x2E8);
    }

    #[test]
    fn test_add_in_card_addresses() {
        assert_eq!(base_address(4), 0xEC98);
        assert_eq!(base_address(7), 0xDCD0);
    }

    #[test]
    fn test_unknown_ports_fall_back_to_com1() {
        for port in [8, 9, 100, -1, i64::MIN, i64::MAX] {
            assert_eq!(base_address(port), 0x3F8, "port {}", port);
            assert!(!is_known_port(port));
        }
    }

    #[test]
    fn test_mcr_address() {
        assert_eq!(mcr_address(0), 0x3FC);
        assert_eq!(mcr_address(1), 0x2FC);
        assert_eq!(mcr_address(4), 0xEC9C);
        assert_eq!(mcr_address(42), 0x3FC);
    }

    #[test]
    fn test_device_lookup() {
        assert_eq!(port_for_device("/dev/ttyS0"), Some(0));
        assert_eq!(port_for_device("/dev/ttyS5"), Some(5));
        assert_eq!(port_for_device("/dev/ttyS8"), None);
        assert_eq!(port_for_device("/dev/ttyUSB0"), None);
        assert_eq!(device_for_port(3), Some("/dev/ttyS3"));
        assert_eq!(device_for_port(8), None);
        assert_eq!(device_for_port(-1), None);
    }
}
