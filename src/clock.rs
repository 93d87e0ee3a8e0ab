// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use bitflags::bitflags;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::checksum::sum_checksum;
use crate::config::BridgeConfig;
use crate::constants::SET_CLOCK;
use crate::date::{pack_timestamp, unpack_timestamp, COMPACT_DATE_LEN};
use crate::error::{ProtocolError, Result};
use crate::types::House;

/// Length of an encoded clock frame, opcode included.
pub const CLOCK_FRAME_LEN: usize = 7;

bitflags! {
    /// Housekeeping requests carried in the low bits of the clock frame's
    /// last byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClockFlags: u8 {
        /// Forget the monitored house's status registers
        const CLEAR_MONITORED_STATUS = 1 << 0;
        /// Restart the battery usage timer
        const CLEAR_BATTERY_TIMER    = 1 << 1;
        /// Cancel the interface's pending timer events
        const PURGE_TIMER            = 1 << 2;
    }
}

/// Clock-set frame sent by the PC, usually in answer to a power-fail signal.
///
/// ```text
/// [0x9B][sec][min 0-119][hr/2][yday low][yday bit 8 | SMTWTFS][house << 4 | flags]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFrame {
    pub house: House,
    pub timestamp: NaiveDateTime,
    pub flags: ClockFlags,
}

impl ClockFrame {
    pub fn new(house: House, timestamp: NaiveDateTime) -> Self {
        Self {
            house,
            timestamp,
            flags: ClockFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: ClockFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Frame for the configured monitored house and clock flags.
    pub fn from_config(config: &BridgeConfig, timestamp: NaiveDateTime) -> Self {
        Self::new(config.monitored_house, timestamp).with_flags(config.clock_flags())
    }

    pub fn clear_battery_timer(&self) -> bool {
        self.flags.contains(ClockFlags::CLEAR_BATTERY_TIMER)
    }

    pub fn clear_monitored_status(&self) -> bool {
        self.flags.contains(ClockFlags::CLEAR_MONITORED_STATUS)
    }

    pub fn purge_timer(&self) -> bool {
        self.flags.contains(ClockFlags::PURGE_TIMER)
    }

    pub fn encode(&self) -> [u8; CLOCK_FRAME_LEN] {
        let mut out = [0u8; CLOCK_FRAME_LEN];
        out[0] = SET_CLOCK;
        out[1..1 + COMPACT_DATE_LEN].copy_from_slice(&pack_timestamp(&self.timestamp));
        out[6] = (self.house.code() << 4) | self.flags.bits();
        out
    }

    /// Sum of the six bytes after the opcode; the interface echoes it back.
    pub fn checksum(&self) -> u8 {
        sum_checksum(&self.encode()[1..])
    }

    /// Decode a frame, placing it in the year nearest to today (UTC).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_near(bytes, Utc::now().date_naive())
    }

    /// Decode a frame, placing it in the year nearest to `reference`.
    pub fn decode_near(bytes: &[u8], reference: NaiveDate) -> Result<Self> {
        if bytes.len() != CLOCK_FRAME_LEN {
            return Err(ProtocolError::invalid(format!(
                "clock frame must be {} bytes, got {}",
                CLOCK_FRAME_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != SET_CLOCK {
            return Err(ProtocolError::invalid(format!(
                "clock frame opcode {:#04x}, expected {:#04x}",
                bytes[0], SET_CLOCK
            )));
        }

        let timestamp = unpack_timestamp(&bytes[1..1 + COMPACT_DATE_LEN], reference)?;
        let last = bytes[6];
        if last & 0x08 != 0 {
            debug!("Ignoring reserved clock flag bit in {:#04x}", last);
        }
        Ok(Self {
            house: House::from_code(last >> 4)?,
            timestamp,
            flags: ClockFlags::from_bits_truncate(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_epoch_frame() {
        let frame = ClockFrame::new(House::E, at(1970, 1, 1, 0, 0, 0)).with_flags(ClockFlags::all());
        assert_eq!(frame.encode(), [0x9B, 0, 0, 0, 1, 0x04, 0x17]);
        assert!(frame.clear_battery_timer());
        assert!(frame.clear_monitored_status());
        assert!(frame.purge_timer());
    }

    #[test]
    fn test_flags_bits() {
        let frame = ClockFrame::new(House::A, at(2021, 3, 14, 13, 5, 9))
            .with_flags(ClockFlags::CLEAR_BATTERY_TIMER);
        let bytes = frame.encode();
        // House A code 0x6, battery bit only; 13:05 packs as minute 65, hour 6
        assert_eq!(bytes[6], 0x62);
        assert_eq!(&bytes[1..4], &[9, 65, 6]);
        assert!(!frame.purge_timer());
    }

    #[test]
    fn test_decode_near_roundtrip() {
        let frame = ClockFrame::new(House::P, at(2024, 12, 31, 21, 30, 0))
            .with_flags(ClockFlags::PURGE_TIMER | ClockFlags::CLEAR_MONITORED_STATUS);
        let reference = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(ClockFrame::decode_near(&frame.encode(), reference).unwrap(), frame);
    }

    #[test]
    fn test_decode_uses_today() {
        let now = Utc::now().naive_utc();
        let frame = ClockFrame::new(House::C, now.date().and_hms_opt(8, 0, 0).unwrap());
        assert_eq!(ClockFrame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn test_checksum() {
        let frame = ClockFrame::new(House::E, at(1970, 1, 1, 0, 0, 0)).with_flags(ClockFlags::all());
        assert_eq!(frame.checksum(), 0x01 + 0x04 + 0x17);
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        let reference = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert!(ClockFrame::decode_near(&[0x9B, 0, 0, 0, 1, 0x04], reference).is_err());
        assert!(ClockFrame::decode_near(&[0x8B, 0, 0, 0, 1, 0x04, 0x17], reference).is_err());
        assert!(ClockFrame::decode_near(&[0x9B, 0, 0, 0, 0, 0x04, 0x17], reference).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = BridgeConfig::builder()
            .monitored_house(House::K)
            .clear_battery_timer(true)
            .build();
        let frame = ClockFrame::from_config(&config, at(2000, 1, 1, 0, 0, 0));
        assert_eq!(frame.house, House::K);
        assert_eq!(frame.flags, ClockFlags::CLEAR_BATTERY_TIMER);
    }
}
