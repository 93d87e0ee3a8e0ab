// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

/// Serial dialogue bytes of the CM11A interface.
pub const SET_CLOCK: u8 = 0x9B; // PC -> interface, followed by 6 clock bytes
pub const STATUS_REQUEST: u8 = 0x8B; // PC -> interface, answered with 14 status bytes
pub const POLL_SIGNAL: u8 = 0x5A; // Interface has an upload buffer ready
pub const PC_READY: u8 = 0xC3; // PC reply to a poll signal
pub const POWER_FAIL: u8 = 0xA5; // Interface lost power and wants the time
pub const INTERFACE_READY: u8 = 0x55; // Interface finished a transmission
pub const ACK: u8 = 0x00; // PC confirms a checksum echoed by the interface

/// Largest dim byte the interface accepts (100%).
pub const MAX_DIM_BYTE: u8 = 210;

/// Number of entries a single transmit packet may carry.
pub const MAX_ENTRIES_PER_BUFFER: usize = 7;

/// Hard ceiling on entries per buffer: the mask header is a single byte.
pub const MASK_BITS: usize = 8;

/// Hardware code of each house letter / unit number, indexed by ordinal
/// (A=0 .. P=15, unit 1=0 .. unit 16=15).
pub const CODE_TABLE: [u8; 16] = [
    0x6, 0xE, 0x2, 0xA, 0x1, 0x9, 0x5, 0xD, 0x7, 0xF, 0x3, 0xB, 0x0, 0x8, 0x4, 0xC,
];

/// Unsolicited bytes the interface may send while the PC is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceSignal {
    /// 0x5A - data waiting; reply with [`PC_READY`].
    Poll,
    /// 0xA5 - power failure; reply with a clock frame.
    PowerFail,
    /// 0x55 - previous transmission completed.
    Ready,
}

impl InterfaceSignal {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            POLL_SIGNAL => Some(Self::Poll),
            POWER_FAIL => Some(Self::PowerFail),
            INTERFACE_READY => Some(Self::Ready),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Poll => POLL_SIGNAL,
            Self::PowerFail => POWER_FAIL,
            Self::Ready => INTERFACE_READY,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Poll => "Poll",
            Self::PowerFail => "Power Fail",
            Self::Ready => "Interface Ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_is_bijective() {
        let mut seen = [false; 16];
        for &code in &CODE_TABLE {
            assert!(!seen[code as usize], "duplicate code {:#x}", code);
            seen[code as usize] = true;
        }
    }

    #[test]
    fn test_interface_signal_from_byte() {
        assert_eq!(InterfaceSignal::from_byte(0x5A), Some(InterfaceSignal::Poll));
        assert_eq!(InterfaceSignal::from_byte(0xA5), Some(InterfaceSignal::PowerFail));
        assert_eq!(InterfaceSignal::from_byte(0x55), Some(InterfaceSignal::Ready));
        assert_eq!(InterfaceSignal::from_byte(0x00), None);
        assert_eq!(InterfaceSignal::Poll.as_byte(), POLL_SIGNAL);
    }

    #[test]
    fn test_buffer_limit_fits_mask() {
        assert!(MAX_ENTRIES_PER_BUFFER <= MASK_BITS);
    }
}
