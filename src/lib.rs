// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec
//
//! # x10-cm11a
//!
//! Wire-protocol codec for CM11A-class X10 serial interfaces.
//!
//! Converts high-level [`Command`]s into the transmit buffers the interface
//! accepts, regroups the entries it uploads back into commands, and encodes
//! the clock and status frames it exchanges with the PC. The serial port
//! itself is left to the caller: everything here works on byte slices.
//!
//! ## Quick Start
//!
//! ```
//! use x10_cm11a::{encode_command, Command, EntryCollector, House, Unit};
//!
//! let command: Command = "B1,5 dim 99".parse()?;
//! let buffers = encode_command(&command);
//! assert_eq!(buffers[0].encode(), vec![5, 0x04, 0xE6, 0xE1, 0xE4, 0xD0]);
//!
//! let mut collector = EntryCollector::new();
//! let decoded = collector.collect_all(buffers[0].entries().iter().copied());
//! assert_eq!(decoded, vec![Command::dim(House::B, 99, [Unit::U1, Unit::U5])]);
//! # Ok::<(), x10_cm11a::ProtocolError>(())
//! ```
//!
//! Inbound bytes from the interface go through an [`InboundDecoder`], which
//! also broadcasts each reconstructed command on a `tokio` channel.

pub mod buffer;
pub mod checksum;
pub mod clock;
pub mod codes;
pub mod collector;
pub mod command;
pub mod config;
pub mod constants;
pub mod date;
pub mod entry;
pub mod error;
pub mod event;
pub mod inbound;
pub mod status;
pub mod types;

// Re-exports for convenience
pub use buffer::{encode_command, encode_command_with_capacity, EntryBuffer};
pub use checksum::short_checksum;
pub use clock::{ClockFlags, ClockFrame};
pub use collector::EntryCollector;
pub use command::{Command, ExtData};
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use date::nearest_date;
pub use entry::{decode_entry, Entry};
pub use error::{ProtocolError, Result};
pub use event::{command_channel, CommandReceiver, CommandSender, InterfaceEvent};
pub use inbound::InboundDecoder;
pub use status::{StatusFrame, UnitMask};
pub use types::{FunctionType, House, Unit};
