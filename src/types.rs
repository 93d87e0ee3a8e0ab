// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// X10 house letter, A through P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum House {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
}

impl House {
    pub const ALL: [House; 16] = [
        House::A,
        House::B,
        House::C,
        House::D,
        House::E,
        House::F,
        House::G,
        House::H,
        House::I,
        House::J,
        House::K,
        House::L,
        House::M,
        House::N,
        House::O,
        House::P,
    ];

    /// Position of the letter in the alphabet, 0-15.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    pub fn letter(&self) -> char {
        (b'A' + *self as u8) as char
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for House {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                let idx = (c.to_ascii_uppercase() as u8).wrapping_sub(b'A') as usize;
                House::from_ordinal(idx)
                    .ok_or_else(|| ProtocolError::invalid(format!("unknown house letter: {s}")))
            }
            _ => Err(ProtocolError::invalid(format!("unknown house letter: {s}"))),
        }
    }
}

impl TryFrom<String> for House {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// X10 unit number, 1 through 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    U1,
    U2,
    U3,
    U4,
    U5,
    U6,
    U7,
    U8,
    U9,
    U10,
    U11,
    U12,
    U13,
    U14,
    U15,
    U16,
}

impl Unit {
    pub const ALL: [Unit; 16] = [
        Unit::U1,
        Unit::U2,
        Unit::U3,
        Unit::U4,
        Unit::U5,
        Unit::U6,
        Unit::U7,
        Unit::U8,
        Unit::U9,
        Unit::U10,
        Unit::U11,
        Unit::U12,
        Unit::U13,
        Unit::U14,
        Unit::U15,
        Unit::U16,
    ];

    /// Zero-based position, so `U1` is 0.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// The number printed on the module, 1-16.
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=16 => Self::from_ordinal(number as usize - 1),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Unit {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Unit::from_number)
            .ok_or_else(|| ProtocolError::invalid(format!("unknown unit number: {s}")))
    }
}

/// How a function relates to addressed units, and whether this codec
/// carries it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionGroup {
    /// Applies to the whole house; no addresses are sent.
    House,
    /// Applies to the addressed units.
    Unit,
    /// Applies to the addressed units with a brightness percentage.
    Dim,
    /// Extended code with a data/command byte pair.
    Ext,
    /// Known to the X10 function table but not encoded or decoded here.
    Unsupported,
}

/// The sixteen X10 function codes. The id is the 4-bit wire code plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FunctionType {
    AllUnitsOff,
    AllLightsOn,
    On,
    Off,
    Dim,
    Bright,
    AllLightsOff,
    Ext,
    HailRequest,
    HailAck,
    PresetDim1,
    PresetDim2,
    ExtendedDataTransfer,
    StatusOn,
    StatusOff,
    StatusRequest,
}

const FUNCTION_NAMES: [(FunctionType, &str); 16] = [
    (FunctionType::AllUnitsOff, "all_units_off"),
    (FunctionType::AllLightsOn, "all_lights_on"),
    (FunctionType::On, "on"),
    (FunctionType::Off, "off"),
    (FunctionType::Dim, "dim"),
    (FunctionType::Bright, "bright"),
    (FunctionType::AllLightsOff, "all_lights_off"),
    (FunctionType::Ext, "ext"),
    (FunctionType::HailRequest, "hail_request"),
    (FunctionType::HailAck, "hail_ack"),
    (FunctionType::PresetDim1, "preset_dim_1"),
    (FunctionType::PresetDim2, "preset_dim_2"),
    (FunctionType::ExtendedDataTransfer, "extended_data_transfer"),
    (FunctionType::StatusOn, "status_on"),
    (FunctionType::StatusOff, "status_off"),
    (FunctionType::StatusRequest, "status_request"),
];

impl FunctionType {
    /// Stable identity, 1-16.
    pub fn id(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=16 => Some(FUNCTION_NAMES[id as usize - 1].0),
            _ => None,
        }
    }

    pub fn group(&self) -> FunctionGroup {
        match self {
            Self::AllUnitsOff | Self::AllLightsOn | Self::AllLightsOff => FunctionGroup::House,
            Self::On | Self::Off => FunctionGroup::Unit,
            Self::Dim | Self::Bright => FunctionGroup::Dim,
            Self::Ext => FunctionGroup::Ext,
            _ => FunctionGroup::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.group() != FunctionGroup::Unsupported
    }

    /// Whether a command of this type is meaningless without addressed units.
    pub fn requires_units(&self) -> bool {
        matches!(
            self.group(),
            FunctionGroup::Unit | FunctionGroup::Dim | FunctionGroup::Ext
        )
    }

    pub fn name(&self) -> &'static str {
        FUNCTION_NAMES[*self as usize].1
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FunctionType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        FUNCTION_NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(f, _)| *f)
            .ok_or_else(|| ProtocolError::invalid(format!("unknown function: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_letters() {
        assert_eq!(House::A.letter(), 'A');
        assert_eq!(House::P.letter(), 'P');
        assert_eq!(House::L.ordinal(), 11);
        assert_eq!("c".parse::<House>().unwrap(), House::C);
        assert!("Q".parse::<House>().is_err());
        assert!("AB".parse::<House>().is_err());
        assert!("".parse::<House>().is_err());
    }

    #[test]
    fn test_unit_numbers() {
        assert_eq!(Unit::U1.number(), 1);
        assert_eq!(Unit::U16.number(), 16);
        assert_eq!(Unit::from_number(12), Some(Unit::U12));
        assert_eq!(Unit::from_number(0), None);
        assert_eq!(Unit::from_number(17), None);
        assert_eq!("7".parse::<Unit>().unwrap(), Unit::U7);
        assert!("x".parse::<Unit>().is_err());
    }

    #[test]
    fn test_function_ids_and_groups() {
        assert_eq!(FunctionType::AllUnitsOff.id(), 1);
        assert_eq!(FunctionType::Off.id(), 4);
        assert_eq!(FunctionType::Ext.id(), 8);
        assert_eq!(FunctionType::StatusRequest.id(), 16);
        for id in 1..=16 {
            assert_eq!(FunctionType::from_id(id).unwrap().id(), id);
        }
        assert_eq!(FunctionType::from_id(0), None);
        assert_eq!(FunctionType::from_id(17), None);

        assert_eq!(FunctionType::AllLightsOff.group(), FunctionGroup::House);
        assert_eq!(FunctionType::On.group(), FunctionGroup::Unit);
        assert_eq!(FunctionType::Bright.group(), FunctionGroup::Dim);
        assert_eq!(FunctionType::Ext.group(), FunctionGroup::Ext);
        assert!(!FunctionType::HailAck.is_supported());
        assert!(FunctionType::Dim.requires_units());
        assert!(!FunctionType::AllLightsOn.requires_units());
    }

    #[test]
    fn test_function_names() {
        assert_eq!("ON".parse::<FunctionType>().unwrap(), FunctionType::On);
        assert_eq!(
            "all-lights-off".parse::<FunctionType>().unwrap(),
            FunctionType::AllLightsOff
        );
        assert_eq!(FunctionType::PresetDim2.to_string(), "preset_dim_2");
        assert!("toggle".parse::<FunctionType>().is_err());
    }
}
