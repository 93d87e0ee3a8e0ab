// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use crate::types::House;

/// All errors that can occur while encoding or decoding CM11A traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A byte sequence does not describe a valid entry or frame:
    /// an unknown nibble, an out-of-range dim byte, or a bad length.
    #[error("Invalid encoding: {details}")]
    InvalidEncoding { details: String },

    /// A unit-level function arrived with no addressed units to apply to.
    #[error("Function {function} for house {house} has no addressed units")]
    IncompleteGroup { house: House, function: String },

    /// Address or function entries from different houses were mixed
    /// without an intervening function.
    #[error("House mismatch: pending group is for {expected}, entry is for {found}")]
    HouseMismatch { expected: House, found: House },

    /// A function id outside the eight types this codec carries on the wire.
    #[error("Unsupported function id {id}")]
    UnsupportedFunction { id: u8 },

    #[error("Entry buffer full (capacity {capacity})")]
    BufferFull { capacity: usize },

    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },
}

impl ProtocolError {
    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        ProtocolError::InvalidEncoding {
            details: details.into(),
        }
    }

    /// Whether a stream decoder can drop the offending entry and carry on.
    ///
    /// Grouping errors only concern the entry that triggered them; encoding
    /// errors mean the byte stream itself is out of step and the caller has
    /// to resynchronise or abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtocolError::IncompleteGroup { .. }
                | ProtocolError::HouseMismatch { .. }
                | ProtocolError::UnsupportedFunction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ProtocolError::HouseMismatch {
            expected: House::A,
            found: House::B
        }
        .is_recoverable());
        assert!(ProtocolError::IncompleteGroup {
            house: House::C,
            function: "on".to_string()
        }
        .is_recoverable());
        assert!(!ProtocolError::invalid("bad nibble").is_recoverable());
        assert!(!ProtocolError::BufferFull { capacity: 7 }.is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = ProtocolError::HouseMismatch {
            expected: House::E,
            found: House::F,
        };
        assert_eq!(
            err.to_string(),
            "House mismatch: pending group is for E, entry is for F"
        );
        assert_eq!(
            ProtocolError::UnsupportedFunction { id: 9 }.to_string(),
            "Unsupported function id 9"
        );
    }
}
