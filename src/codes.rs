// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

//! House and unit hardware codes.
//!
//! X10 does not number houses or units sequentially on the wire. Both share
//! one fixed 16-entry permutation, indexed by ordinal position.

use crate::constants::CODE_TABLE;
use crate::error::{ProtocolError, Result};
use crate::types::{House, Unit};

/// Hardware nibble for an ordinal position (0-15). Positions above 15 wrap
/// to their low nibble.
pub fn code_of(position: usize) -> u8 {
    CODE_TABLE[position & 0x0F]
}

/// Ordinal position of a hardware nibble, if the nibble is in the table.
pub fn position_of(nibble: u8) -> Option<usize> {
    CODE_TABLE.iter().position(|&c| c == nibble)
}

impl House {
    pub fn code(&self) -> u8 {
        code_of(self.ordinal())
    }

    pub fn from_code(nibble: u8) -> Result<Self> {
        position_of(nibble)
            .and_then(House::from_ordinal)
            .ok_or_else(|| ProtocolError::invalid(format!("unknown house code {:#x}", nibble)))
    }
}

impl Unit {
    pub fn code(&self) -> u8 {
        code_of(self.ordinal())
    }

    pub fn from_code(nibble: u8) -> Result<Self> {
        position_of(nibble)
            .and_then(Unit::from_ordinal)
            .ok_or_else(|| ProtocolError::invalid(format!("unknown unit code {:#x}", nibble)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(House::A.code(), 0x6);
        assert_eq!(House::L.code(), 0xB);
        assert_eq!(House::M.code(), 0x0);
        assert_eq!(Unit::U12.code(), 0xB);
        assert_eq!(Unit::U1.code(), 0x6);
    }

    #[test]
    fn test_code_roundtrip() {
        for house in House::ALL {
            assert_eq!(House::from_code(house.code()).unwrap(), house);
        }
        for unit in Unit::ALL {
            assert_eq!(Unit::from_code(unit.code()).unwrap(), unit);
        }
    }

    #[test]
    fn test_unknown_nibble() {
        assert_eq!(position_of(0x10), None);
        assert!(House::from_code(0x1F).is_err());
        assert!(Unit::from_code(0xFF).is_err());
    }
}
