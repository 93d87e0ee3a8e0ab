// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use crate::command::Command;

/// Something the interface told us without being asked.
///
/// Produced by [`InboundDecoder`](crate::inbound::InboundDecoder); consumers
/// subscribe to the command channel for the commands themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceEvent {
    /// The interface has an upload buffer ready. Reply with `PC_READY` and
    /// call `poll_acknowledged()` before feeding the next bytes.
    Poll,
    /// The interface lost power and its clock is unset. Reply with a
    /// `ClockFrame`.
    PowerFailure,
    /// A command reconstructed from the powerline.
    Command(Command),
}

/// Type alias for the broadcast sender.
pub type CommandSender = tokio::sync::broadcast::Sender<Command>;

/// Type alias for the broadcast receiver.
pub type CommandReceiver = tokio::sync::broadcast::Receiver<Command>;

/// Create a new command channel with the given capacity.
pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
