// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use std::collections::BTreeSet;

use bitflags::bitflags;
use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::date::{pack_timestamp, unpack_timestamp, COMPACT_DATE_LEN};
use crate::error::{ProtocolError, Result};
use crate::types::{House, Unit};

/// Length of the interface's answer to a status request.
pub const STATUS_FRAME_LEN: usize = 14;

bitflags! {
    /// One bit per unit of the monitored house, bit *i* = unit *i + 1*.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UnitMask: u16 {
        const U1  = 1 << 0;
        const U2  = 1 << 1;
        const U3  = 1 << 2;
        const U4  = 1 << 3;
        const U5  = 1 << 4;
        const U6  = 1 << 5;
        const U7  = 1 << 6;
        const U8  = 1 << 7;
        const U9  = 1 << 8;
        const U10 = 1 << 9;
        const U11 = 1 << 10;
        const U12 = 1 << 11;
        const U13 = 1 << 12;
        const U14 = 1 << 13;
        const U15 = 1 << 14;
        const U16 = 1 << 15;
    }
}

impl UnitMask {
    pub fn from_unit(unit: Unit) -> Self {
        Self::from_bits_retain(1 << unit.ordinal())
    }

    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        units
            .into_iter()
            .fold(Self::empty(), |mask, &unit| mask | Self::from_unit(unit))
    }

    pub fn contains_unit(&self, unit: Unit) -> bool {
        self.contains(Self::from_unit(unit))
    }

    /// Units whose bit is set, in ascending order.
    pub fn units(&self) -> BTreeSet<Unit> {
        Unit::ALL
            .into_iter()
            .filter(|&unit| self.contains_unit(unit))
            .collect()
    }
}

/// The interface's 14-byte reply to a status request (0x8B).
///
/// ```text
/// [battery timer hi][lo][sec][min][hr/2][yday low][yday bit 8 | SMTWTFS]
/// [house << 4 | firmware][addressed hi][lo][on/off hi][lo][dim hi][lo]
/// ```
///
/// The bitmaps describe the monitored house only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    /// Minutes on battery since the timer was last cleared.
    pub battery_timer: u16,
    pub timestamp: NaiveDateTime,
    /// Firmware revision, 0-15.
    pub firmware: u8,
    pub house: House,
    pub addressed: UnitMask,
    pub on_off: UnitMask,
    pub dim: UnitMask,
}

impl StatusFrame {
    pub fn encode(&self) -> [u8; STATUS_FRAME_LEN] {
        let mut out = [0u8; STATUS_FRAME_LEN];
        out[0..2].copy_from_slice(&self.battery_timer.to_be_bytes());
        out[2..2 + COMPACT_DATE_LEN].copy_from_slice(&pack_timestamp(&self.timestamp));
        out[7] = (self.house.code() << 4) | (self.firmware & 0x0F);
        out[8..10].copy_from_slice(&self.addressed.bits().to_be_bytes());
        out[10..12].copy_from_slice(&self.on_off.bits().to_be_bytes());
        out[12..14].copy_from_slice(&self.dim.bits().to_be_bytes());
        out
    }

    /// Decode a status reply, placing it in the year nearest to today (UTC).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_near(bytes, Utc::now().date_naive())
    }

    /// Decode a status reply, placing it in the year nearest to `reference`.
    pub fn decode_near(bytes: &[u8], reference: NaiveDate) -> Result<Self> {
        if bytes.len() != STATUS_FRAME_LEN {
            return Err(ProtocolError::invalid(format!(
                "status frame must be {} bytes, got {}",
                STATUS_FRAME_LEN,
                bytes.len()
            )));
        }
        let word = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);

        Ok(Self {
            battery_timer: word(0),
            timestamp: unpack_timestamp(&bytes[2..2 + COMPACT_DATE_LEN], reference)?,
            firmware: bytes[7] & 0x0F,
            house: House::from_code(bytes[7] >> 4)?,
            addressed: UnitMask::from_bits_retain(word(8)),
            on_off: UnitMask::from_bits_retain(word(10)),
            dim: UnitMask::from_bits_retain(word(12)),
        })
    }
}
