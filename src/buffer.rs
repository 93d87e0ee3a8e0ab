// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use tracing::debug;

use crate::checksum::sum_checksum;
use crate::command::Command;
use crate::constants::{MASK_BITS, MAX_ENTRIES_PER_BUFFER};
use crate::entry::{decode_entry, Entry};
use crate::error::{ProtocolError, Result};

/// One transmittable packet: a bounded run of entries behind a two-byte
/// header.
///
/// # Wire format
///
/// ```text
/// [length][mask][entry bytes...]
/// ```
///
/// - `length` counts every byte after itself (mask + entry bytes).
/// - `mask` has bit *i* set when entry *i* is function-context
///   (Function/Dim/Ext) and clear when it is an Address.
///
/// The interface uses the same layout for the upload buffers it sends after
/// a poll, which is what [`EntryBuffer::decode`] reads.
#[derive(Debug, Clone)]
pub struct EntryBuffer {
    entries: Vec<Entry>,
    capacity: usize,
}

impl PartialEq for EntryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for EntryBuffer {}

impl Default for EntryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryBuffer {
    /// An empty buffer holding up to [`MAX_ENTRIES_PER_BUFFER`] entries.
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_ENTRIES_PER_BUFFER),
            capacity: MAX_ENTRIES_PER_BUFFER,
        }
    }

    /// An empty buffer with a custom entry limit (1 to 8; the mask is one byte).
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut buffer = Self::new();
        for entry in entries {
            buffer.push(entry)?;
        }
        Ok(buffer)
    }

    pub fn push(&mut self, entry: Entry) -> Result<()> {
        entry.validate()?;
        if self.is_full() {
            return Err(ProtocolError::BufferFull {
                capacity: self.capacity,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Header mask: bit *i* set for each function-context entry.
    pub fn mask(&self) -> u8 {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_function())
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    pub fn encode(&self) -> Vec<u8> {
        let body_len: usize = self.entries.iter().map(Entry::encoded_len).sum();
        let mut out = Vec::with_capacity(2 + body_len);
        out.push((1 + body_len) as u8);
        out.push(self.mask());
        for entry in &self.entries {
            entry.write_to(&mut out);
        }
        out
    }

    /// Byte-sum of everything after the length byte, as echoed back by the
    /// interface for verification.
    pub fn checksum(&self) -> u8 {
        sum_checksum(&self.encode()[1..])
    }

    /// Parse a `[length][mask][entries...]` buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&length, rest) = bytes
            .split_first()
            .ok_or_else(|| ProtocolError::invalid("empty buffer"))?;
        if length as usize != rest.len() {
            return Err(ProtocolError::invalid(format!(
                "length byte says {} but {} bytes follow",
                length,
                rest.len()
            )));
        }
        let (&mask, mut body) = rest
            .split_first()
            .ok_or_else(|| ProtocolError::invalid("buffer has no mask byte"))?;

        let mut entries = Vec::new();
        while !body.is_empty() {
            let index = entries.len();
            if index >= MASK_BITS {
                return Err(ProtocolError::invalid("more entries than mask bits"));
            }
            let entry = decode_entry(mask & (1 << index) != 0, body)?;
            body = &body[entry.encoded_len()..];
            entries.push(entry);
        }

        let unused = if entries.len() >= MASK_BITS {
            0
        } else {
            mask >> entries.len()
        };
        if unused != 0 {
            debug!("Ignoring mask bits beyond last entry: {:#04x}", mask);
        }

        Ok(Self {
            capacity: entries.len().max(MAX_ENTRIES_PER_BUFFER),
            entries,
        })
    }
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 || capacity > MASK_BITS {
        return Err(ProtocolError::InvalidConfig {
            details: format!("buffer capacity must be 1-{}, got {}", MASK_BITS, capacity),
        });
    }
    Ok(())
}

/// Split a command into transmittable buffers of at most
/// [`MAX_ENTRIES_PER_BUFFER`] entries.
///
/// Addresses come first in ascending unit order, then the single function
/// entry. A no-op command produces no buffers.
pub fn encode_command(command: &Command) -> Vec<EntryBuffer> {
    chunk(command, MAX_ENTRIES_PER_BUFFER)
}

/// [`encode_command`] with a non-default entry limit.
pub fn encode_command_with_capacity(command: &Command, capacity: usize) -> Result<Vec<EntryBuffer>> {
    check_capacity(capacity)?;
    Ok(chunk(command, capacity))
}

fn chunk(command: &Command, capacity: usize) -> Vec<EntryBuffer> {
    let mut buffers = Vec::new();
    let mut current = EntryBuffer {
        entries: Vec::with_capacity(capacity),
        capacity,
    };
    // Entries from a Command are valid by construction
    for entry in command.to_entries() {
        if current.is_full() {
            let next = EntryBuffer {
                entries: Vec::with_capacity(capacity),
                capacity,
            };
            buffers.push(std::mem::replace(&mut current, next));
        }
        current.entries.push(entry);
    }
    if !current.is_empty() {
        buffers.push(current);
    }
    debug!("Encoded '{}' into {} buffer(s)", command, buffers.len());
    buffers
}
