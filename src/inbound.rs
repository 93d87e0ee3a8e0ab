// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use tracing::{debug, trace, warn};

use crate::buffer::EntryBuffer;
use crate::collector::EntryCollector;
use crate::config::BridgeConfig;
use crate::constants::{InterfaceSignal, MASK_BITS};
use crate::error::{ProtocolError, Result};
use crate::event::{command_channel, CommandReceiver, CommandSender, InterfaceEvent};

/// Mask byte plus at most eight data bytes.
const MAX_UPLOAD_LEN: usize = 1 + MASK_BITS;

#[derive(Debug)]
enum State {
    /// Between dialogues; only signal bytes are expected.
    Idle,
    /// `PC_READY` was sent; the next byte is the upload length.
    AwaitingLength,
    /// Collecting the upload buffer, length byte included.
    Reading { expected: usize, bytes: Vec<u8> },
}

/// Turns the raw bytes the interface sends into events and commands.
///
/// The transport owns the serial port and the replies; this type only
/// interprets what comes in:
///
/// 1. `0x5A` yields [`InterfaceEvent::Poll`]. The transport answers
///    `PC_READY` and calls [`poll_acknowledged`](Self::poll_acknowledged).
/// 2. The interface then sends `[length][mask][data...]`, which is decoded as
///    an [`EntryBuffer`] and fed through an [`EntryCollector`]. Groups may
///    span several uploads.
/// 3. `0xA5` yields [`InterfaceEvent::PowerFailure`]; the transport answers
///    with a clock frame.
///
/// Every reconstructed command is returned and also broadcast on the
/// command channel.
#[derive(Debug)]
pub struct InboundDecoder {
    state: State,
    collector: EntryCollector,
    command_tx: CommandSender,
}

impl InboundDecoder {
    /// Create a decoder broadcasting on a fresh channel.
    pub fn new(capacity: usize) -> (Self, CommandReceiver) {
        let (tx, rx) = command_channel(capacity);
        (Self::with_sender(tx), rx)
    }

    /// Create a decoder using the configured channel capacity.
    pub fn from_config(config: &BridgeConfig) -> Result<(Self, CommandReceiver)> {
        config.validate()?;
        Ok(Self::new(config.event_capacity))
    }

    /// Create a decoder broadcasting on an existing channel.
    pub fn with_sender(command_tx: CommandSender) -> Self {
        Self {
            state: State::Idle,
            collector: EntryCollector::new(),
            command_tx,
        }
    }

    /// Subscribe to reconstructed commands.
    pub fn subscribe(&self) -> CommandReceiver {
        self.command_tx.subscribe()
    }

    pub fn collector(&self) -> &EntryCollector {
        &self.collector
    }

    /// The transport replied `PC_READY`; expect an upload buffer next.
    pub fn poll_acknowledged(&mut self) {
        self.state = State::AwaitingLength;
    }

    /// Whether an upload buffer is in progress.
    pub fn is_receiving(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Drop any partial upload and any pending address group.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.collector.reset();
    }

    /// Feed received bytes in arrival order.
    ///
    /// A malformed upload returns `InvalidEncoding` and puts the decoder back
    /// to idle. Commands completed earlier in the same call have already been
    /// broadcast.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<InterfaceEvent>> {
        let mut events = Vec::new();
        for &byte in bytes {
            if let Err(e) = self.push_byte(byte, &mut events) {
                self.state = State::Idle;
                return Err(e);
            }
        }
        Ok(events)
    }

    fn push_byte(&mut self, byte: u8, events: &mut Vec<InterfaceEvent>) -> Result<()> {
        match &mut self.state {
            State::Idle => match InterfaceSignal::from_byte(byte) {
                Some(InterfaceSignal::Poll) => {
                    debug!("Interface poll");
                    events.push(InterfaceEvent::Poll);
                }
                Some(InterfaceSignal::PowerFail) => {
                    warn!("Interface reports power failure, clock needs setting");
                    events.push(InterfaceEvent::PowerFailure);
                }
                Some(InterfaceSignal::Ready) => trace!("Interface ready"),
                None => warn!("Ignoring unexpected byte {:#04x} while idle", byte),
            },
            State::AwaitingLength => {
                let expected = byte as usize;
                if expected == 0 || expected > MAX_UPLOAD_LEN {
                    return Err(ProtocolError::invalid(format!(
                        "upload length {} outside 1-{}",
                        expected, MAX_UPLOAD_LEN
                    )));
                }
                self.state = State::Reading {
                    expected,
                    bytes: vec![byte],
                };
            }
            State::Reading { expected, bytes } => {
                bytes.push(byte);
                if bytes.len() == *expected + 1 {
                    let buffer = EntryBuffer::decode(bytes)?;
                    self.state = State::Idle;
                    self.dispatch(buffer, events);
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, buffer: EntryBuffer, events: &mut Vec<InterfaceEvent>) {
        debug!("Upload buffer with {} entries", buffer.len());
        for &entry in buffer.entries() {
            match self.collector.collect(entry) {
                Ok(Some(command)) => {
                    debug!("Received {}", command);
                    let _ = self.command_tx.send(command.clone());
                    events.push(InterfaceEvent::Command(command));
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping entry {}: {}", entry, e),
            }
        }
    }
}
