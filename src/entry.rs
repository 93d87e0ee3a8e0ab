// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use std::fmt;

use crate::constants::MAX_DIM_BYTE;
use crate::error::{ProtocolError, Result};
use crate::types::{FunctionGroup, FunctionType, House, Unit};

/// One wire-protocol atom.
///
/// The first byte of every entry is `house code << 4 | low nibble`. For an
/// address the low nibble is a unit code, for everything else it is the
/// function code. The two overlap, so the byte alone does not say which it
/// is: that flag travels in the buffer mask, see [`decode_entry`].
///
/// | Variant    | Bytes | Layout                              |
/// |------------|-------|-------------------------------------|
/// | `Address`  | 1     | `HU`                                |
/// | `Function` | 1     | `HF`                                |
/// | `Dim`      | 2     | `HF`, dim byte 0-210                |
/// | `Ext`      | 3     | `H7`, data, command                 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    Address { house: House, unit: Unit },
    Function { house: House, function: FunctionType },
    Dim { house: House, function: FunctionType, percent: u8 },
    Ext { house: House, data: u8, command: u8 },
}

impl Entry {
    pub fn house(&self) -> House {
        match *self {
            Entry::Address { house, .. }
            | Entry::Function { house, .. }
            | Entry::Dim { house, .. }
            | Entry::Ext { house, .. } => house,
        }
    }

    /// Whether this entry sets its bit in the buffer mask.
    pub fn is_function(&self) -> bool {
        !matches!(self, Entry::Address { .. })
    }

    /// The function carried by a function-context entry.
    pub fn function(&self) -> Option<FunctionType> {
        match *self {
            Entry::Address { .. } => None,
            Entry::Function { function, .. } | Entry::Dim { function, .. } => Some(function),
            Entry::Ext { .. } => Some(FunctionType::Ext),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Entry::Address { .. } | Entry::Function { .. } => 1,
            Entry::Dim { .. } => 2,
            Entry::Ext { .. } => 3,
        }
    }

    /// Check that the function type matches the variant it sits in.
    pub fn validate(&self) -> Result<()> {
        let (function, allowed): (FunctionType, &[FunctionGroup]) = match *self {
            Entry::Address { .. } | Entry::Ext { .. } => return Ok(()),
            Entry::Function { function, .. } => {
                (function, &[FunctionGroup::House, FunctionGroup::Unit][..])
            }
            Entry::Dim { function, .. } => (function, &[FunctionGroup::Dim][..]),
        };
        let group = function.group();
        if group == FunctionGroup::Unsupported {
            return Err(ProtocolError::UnsupportedFunction { id: function.id() });
        }
        if !allowed.contains(&group) {
            return Err(ProtocolError::invalid(format!(
                "function {} cannot be carried by a {:?} entry",
                function, self
            )));
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        Ok(out)
    }

    /// Append the wire bytes. Callers validate first.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Entry::Address { house, unit } => out.push(pack(house, unit.code())),
            Entry::Function { house, function } => out.push(pack(house, function.id() - 1)),
            Entry::Dim {
                house,
                function,
                percent,
            } => {
                out.push(pack(house, function.id() - 1));
                out.push(encode_dim_byte(percent));
            }
            Entry::Ext {
                house,
                data,
                command,
            } => {
                out.push(pack(house, FunctionType::Ext.id() - 1));
                out.push(data);
                out.push(command);
            }
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Address { house, unit } => write!(f, "{}{}", house, unit),
            Entry::Function { house, function } => write!(f, "{} {}", house, function),
            Entry::Dim {
                house,
                function,
                percent,
            } => write!(f, "{} {} {}%", house, function, percent),
            Entry::Ext {
                house,
                data,
                command,
            } => write!(f, "{} ext {:02X}:{:02X}", house, data, command),
        }
    }
}

fn pack(house: House, low: u8) -> u8 {
    (house.code() << 4) | (low & 0x0F)
}

/// Scale a percentage onto the interface's 0-210 dim range, rounding to nearest.
pub fn encode_dim_byte(percent: u8) -> u8 {
    let scaled = (percent as u32 * MAX_DIM_BYTE as u32 + 50) / 100;
    scaled.min(MAX_DIM_BYTE as u32) as u8
}

/// Inverse of [`encode_dim_byte`].
pub fn decode_dim_byte(byte: u8) -> Result<u8> {
    if byte > MAX_DIM_BYTE {
        return Err(ProtocolError::invalid(format!(
            "dim byte {} exceeds {}",
            byte, MAX_DIM_BYTE
        )));
    }
    Ok(((byte as u32 * 100 + MAX_DIM_BYTE as u32 / 2) / MAX_DIM_BYTE as u32) as u8)
}

/// Decode one entry from the front of `bytes`.
///
/// `is_function_context` comes from the framing layer (the buffer mask) and
/// decides whether the low nibble of the first byte is a unit code or a
/// function code. Trailing bytes beyond the entry are ignored; use
/// [`Entry::encoded_len`] to advance.
pub fn decode_entry(is_function_context: bool, bytes: &[u8]) -> Result<Entry> {
    let first = *bytes
        .first()
        .ok_or_else(|| ProtocolError::invalid("empty entry"))?;
    let house = House::from_code(first >> 4)?;
    let low = first & 0x0F;

    if !is_function_context {
        let unit = Unit::from_code(low)?;
        return Ok(Entry::Address { house, unit });
    }

    let id = low + 1;
    let function =
        FunctionType::from_id(id).ok_or(ProtocolError::UnsupportedFunction { id })?;
    match function.group() {
        FunctionGroup::House | FunctionGroup::Unit => Ok(Entry::Function { house, function }),
        FunctionGroup::Dim => {
            let level = *bytes
                .get(1)
                .ok_or_else(|| ProtocolError::invalid("truncated dim entry"))?;
            Ok(Entry::Dim {
                house,
                function,
                percent: decode_dim_byte(level)?,
            })
        }
        FunctionGroup::Ext => match bytes {
            [_, data, command, ..] => Ok(Entry::Ext {
                house,
                data: *data,
                command: *command,
            }),
            _ => Err(ProtocolError::invalid("truncated extended entry")),
        },
        FunctionGroup::Unsupported => Err(ProtocolError::UnsupportedFunction { id }),
    }
}
