// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::command::{Command, ExtData};
use crate::entry::Entry;
use crate::error::{ProtocolError, Result};
use crate::types::{FunctionGroup, FunctionType, House, Unit};

/// Regroups a flat stream of decoded entries into commands.
///
/// Addresses accumulate into a pending group until a function entry closes
/// it. One collector per byte stream; it is not shared.
///
/// - `Address` for the pending house (or with nothing pending) joins the
///   group. An address for another house discards the stale group and
///   starts over; the discard is reported as `HouseMismatch`.
/// - A house-level function always yields a command for its own house and
///   clears everything pending.
/// - A unit, dim or ext function needs pending units of the same house.
///   Without units it fails with `IncompleteGroup`, with units of another
///   house it fails with `HouseMismatch`. Either way the entry is dropped and
///   the pending group is left as it was.
/// - After a unit-level command the units are cleared but the house is
///   kept, so the next address for that house starts a fresh group.
#[derive(Debug, Default)]
pub struct EntryCollector {
    pending_house: Option<House>,
    pending_units: BTreeSet<Unit>,
}

impl EntryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_house(&self) -> Option<House> {
        self.pending_house
    }

    pub fn pending_units(&self) -> &BTreeSet<Unit> {
        &self.pending_units
    }

    /// Drop any partially collected group.
    pub fn reset(&mut self) {
        self.pending_house = None;
        self.pending_units.clear();
    }

    /// Feed one entry. Returns a command when the entry completes one.
    ///
    /// Errors are recoverable (see [`ProtocolError::is_recoverable`]); the
    /// collector stays usable and the next entry is processed normally.
    pub fn collect(&mut self, entry: Entry) -> Result<Option<Command>> {
        match entry {
            Entry::Address { house, unit } => self.collect_address(house, unit),
            Entry::Function { house, function } => {
                self.collect_function(house, function, None, None)
            }
            Entry::Dim {
                house,
                function,
                percent,
            } => self.collect_function(house, function, Some(percent), None),
            Entry::Ext {
                house,
                data,
                command,
            } => self.collect_function(
                house,
                FunctionType::Ext,
                None,
                Some(ExtData { data, command }),
            ),
        }
    }

    /// Feed several entries, keeping every completed command and skipping
    /// entries that fail to group.
    pub fn collect_all(&mut self, entries: impl IntoIterator<Item = Entry>) -> Vec<Command> {
        let mut commands = Vec::new();
        for entry in entries {
            match self.collect(entry) {
                Ok(Some(command)) => commands.push(command),
                Ok(None) => {}
                Err(e) => warn!("Skipping entry {}: {}", entry, e),
            }
        }
        commands
    }

    fn collect_address(&mut self, house: House, unit: Unit) -> Result<Option<Command>> {
        match self.pending_house {
            Some(pending) if pending != house => {
                let stale = std::mem::take(&mut self.pending_units);
                self.pending_house = Some(house);
                self.pending_units.insert(unit);
                if stale.is_empty() {
                    debug!("Address {}{} switches house from {}", house, unit, pending);
                    Ok(None)
                } else {
                    warn!(
                        "Discarding {} pending unit(s) of house {}: address {}{} arrived first",
                        stale.len(),
                        pending,
                        house,
                        unit
                    );
                    Err(ProtocolError::HouseMismatch {
                        expected: pending,
                        found: house,
                    })
                }
            }
            _ => {
                self.pending_house = Some(house);
                self.pending_units.insert(unit);
                Ok(None)
            }
        }
    }

    fn collect_function(
        &mut self,
        house: House,
        function: FunctionType,
        percent: Option<u8>,
        ext: Option<ExtData>,
    ) -> Result<Option<Command>> {
        if function.group() == FunctionGroup::House {
            if let Some(pending) = self.pending_house {
                if pending != house && !self.pending_units.is_empty() {
                    warn!(
                        "Discarding {} pending unit(s) of house {} before {} {}",
                        self.pending_units.len(),
                        pending,
                        house,
                        function
                    );
                }
            }
            let command = Command::try_new(house, [], function, percent, ext)?;
            self.reset();
            debug!("Collected {}", command);
            return Ok(Some(command));
        }

        if self.pending_units.is_empty() {
            debug!("Dropping {} {}: no addressed units", house, function);
            return Err(ProtocolError::IncompleteGroup {
                house,
                function: function.to_string(),
            });
        }
        let pending = self.pending_house.unwrap_or(house);
        if pending != house {
            debug!("Dropping {} {}: pending group is for {}", house, function, pending);
            return Err(ProtocolError::HouseMismatch {
                expected: pending,
                found: house,
            });
        }

        let command = Command::try_new(
            house,
            self.pending_units.iter().copied(),
            function,
            percent,
            ext,
        )?;
        self.pending_units.clear();
        debug!("Collected {}", command);
        Ok(Some(command))
    }
}
