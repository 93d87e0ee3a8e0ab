// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::entry::Entry;
use crate::error::{ProtocolError, Result};
use crate::types::{FunctionGroup, FunctionType, House, Unit};

/// Data and command bytes of an X10 extended code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtData {
    pub data: u8,
    pub command: u8,
}

/// A complete house-automation command: one house, the units it applies
/// to, and what to do with them.
///
/// Units are kept as a set, so two commands naming the same units in a
/// different order compare equal. House-level functions (`all_units_off`,
/// `all_lights_on`, `all_lights_off`) never carry units.
///
/// # Notation
///
/// `Display` and `FromStr` use `<house><units> <function> [argument]`:
///
/// ```text
/// A1,2 on
/// B1-7 dim 99
/// C all_lights_off
/// D5 ext 31:01
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    house: House,
    units: BTreeSet<Unit>,
    function: FunctionType,
    percent: Option<u8>,
    ext: Option<ExtData>,
}

impl Command {
    /// Build a command, checking that the payload fits the function.
    ///
    /// Dim/bright need a percentage (clamped to 100), ext needs its byte
    /// pair. Payloads irrelevant to the function are dropped, as are units
    /// passed to a house-level function.
    pub fn try_new(
        house: House,
        units: impl IntoIterator<Item = Unit>,
        function: FunctionType,
        percent: Option<u8>,
        ext: Option<ExtData>,
    ) -> Result<Self> {
        let mut units: BTreeSet<Unit> = units.into_iter().collect();
        let (percent, ext) = match function.group() {
            FunctionGroup::Unsupported => {
                return Err(ProtocolError::UnsupportedFunction { id: function.id() })
            }
            FunctionGroup::House => {
                units.clear();
                (None, None)
            }
            FunctionGroup::Unit => (None, None),
            FunctionGroup::Dim => match percent {
                Some(p) => (Some(p.min(100)), None),
                None => {
                    return Err(ProtocolError::invalid(format!(
                        "{} command needs a percentage",
                        function
                    )))
                }
            },
            FunctionGroup::Ext => match ext {
                Some(e) => (None, Some(e)),
                None => return Err(ProtocolError::invalid("ext command needs data and command bytes")),
            },
        };
        Ok(Self {
            house,
            units,
            function,
            percent,
            ext,
        })
    }

    fn with(house: House, units: BTreeSet<Unit>, function: FunctionType) -> Self {
        Self {
            house,
            units,
            function,
            percent: None,
            ext: None,
        }
    }

    pub fn on(house: House, units: impl IntoIterator<Item = Unit>) -> Self {
        Self::with(house, units.into_iter().collect(), FunctionType::On)
    }

    pub fn off(house: House, units: impl IntoIterator<Item = Unit>) -> Self {
        Self::with(house, units.into_iter().collect(), FunctionType::Off)
    }

    pub fn dim(house: House, percent: u8, units: impl IntoIterator<Item = Unit>) -> Self {
        let mut cmd = Self::with(house, units.into_iter().collect(), FunctionType::Dim);
        cmd.percent = Some(percent.min(100));
        cmd
    }

    pub fn bright(house: House, percent: u8, units: impl IntoIterator<Item = Unit>) -> Self {
        let mut cmd = Self::with(house, units.into_iter().collect(), FunctionType::Bright);
        cmd.percent = Some(percent.min(100));
        cmd
    }

    pub fn ext(house: House, data: u8, command: u8, units: impl IntoIterator<Item = Unit>) -> Self {
        let mut cmd = Self::with(house, units.into_iter().collect(), FunctionType::Ext);
        cmd.ext = Some(ExtData { data, command });
        cmd
    }

    pub fn all_units_off(house: House) -> Self {
        Self::with(house, BTreeSet::new(), FunctionType::AllUnitsOff)
    }

    pub fn all_lights_on(house: House) -> Self {
        Self::with(house, BTreeSet::new(), FunctionType::AllLightsOn)
    }

    pub fn all_lights_off(house: House) -> Self {
        Self::with(house, BTreeSet::new(), FunctionType::AllLightsOff)
    }

    pub fn house(&self) -> House {
        self.house
    }

    /// Addressed units in ascending order.
    pub fn units(&self) -> &BTreeSet<Unit> {
        &self.units
    }

    pub fn function(&self) -> FunctionType {
        self.function
    }

    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    pub fn ext_data(&self) -> Option<ExtData> {
        self.ext
    }

    /// A command that would change nothing: a unit-level function with no
    /// units, or a dim/bright by 0%.
    pub fn is_noop(&self) -> bool {
        (self.function.requires_units() && self.units.is_empty()) || self.percent == Some(0)
    }

    /// The function-context entry that terminates this command on the wire.
    pub fn function_entry(&self) -> Entry {
        let house = self.house;
        match (self.function.group(), self.percent, self.ext) {
            (FunctionGroup::Dim, Some(percent), _) => Entry::Dim {
                house,
                function: self.function,
                percent,
            },
            (FunctionGroup::Ext, _, Some(ExtData { data, command })) => Entry::Ext {
                house,
                data,
                command,
            },
            _ => Entry::Function {
                house,
                function: self.function,
            },
        }
    }

    /// Flatten into wire entries: one address per unit, then the function.
    /// No-op commands flatten to nothing.
    pub fn to_entries(&self) -> Vec<Entry> {
        if self.is_noop() {
            return Vec::new();
        }
        let mut entries: Vec<Entry> = self
            .units
            .iter()
            .map(|&unit| Entry::Address {
                house: self.house,
                unit,
            })
            .collect();
        entries.push(self.function_entry());
        entries
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.house, format_units(&self.units), self.function)?;
        if let Some(p) = self.percent {
            write!(f, " {}", p)?;
        }
        if let Some(ExtData { data, command }) = self.ext {
            write!(f, " {:02X}:{:02X}", data, command)?;
        }
        Ok(())
    }
}

/// Render a unit set compactly: runs of three or more become `a-b`.
fn format_units(units: &BTreeSet<Unit>) -> String {
    let numbers: Vec<u8> = units.iter().map(Unit::number).collect();
    let mut parts = Vec::new();
    let mut i = 0;
    while i < numbers.len() {
        let start = numbers[i];
        let mut end = start;
        while i + 1 < numbers.len() && numbers[i + 1] == end + 1 {
            end += 1;
            i += 1;
        }
        match end - start {
            0 => parts.push(start.to_string()),
            1 => {
                parts.push(start.to_string());
                parts.push(end.to_string());
            }
            _ => parts.push(format!("{}-{}", start, end)),
        }
        i += 1;
    }
    parts.join(",")
}

fn parse_units(s: &str) -> Result<BTreeSet<Unit>> {
    let mut units = BTreeSet::new();
    for part in s.split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: Unit = lo.parse()?;
                let hi: Unit = hi.parse()?;
                if lo > hi {
                    return Err(ProtocolError::invalid(format!("descending unit range: {part}")));
                }
                units.extend(Unit::ALL[lo.ordinal()..=hi.ordinal()].iter().copied());
            }
            None => {
                units.insert(part.parse()?);
            }
        }
    }
    Ok(units)
}

fn parse_hex_byte(s: &str) -> Result<u8> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(digits, 16).map_err(|_| ProtocolError::invalid(format!("bad hex byte: {s}")))
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let target = tokens
            .next()
            .ok_or_else(|| ProtocolError::invalid("empty command"))?;
        let function: FunctionType = tokens
            .next()
            .ok_or_else(|| ProtocolError::invalid(format!("missing function in: {s}")))?
            .parse()?;
        let argument = tokens.next();
        if tokens.next().is_some() {
            return Err(ProtocolError::invalid(format!("trailing input in: {s}")));
        }

        let split = target.char_indices().nth(1).map_or(target.len(), |(i, _)| i);
        let house: House = target[..split].parse()?;
        let units = parse_units(&target[split..])?;

        let mut percent = None;
        let mut ext = None;
        match (function.group(), argument) {
            (FunctionGroup::Dim, Some(arg)) => {
                let value = arg
                    .trim_end_matches('%')
                    .parse::<u8>()
                    .map_err(|_| ProtocolError::invalid(format!("bad percentage: {arg}")))?;
                percent = Some(value);
            }
            (FunctionGroup::Ext, Some(arg)) => {
                let (data, command) = arg
                    .split_once(':')
                    .ok_or_else(|| ProtocolError::invalid(format!("expected data:command, got {arg}")))?;
                ext = Some(ExtData {
                    data: parse_hex_byte(data)?,
                    command: parse_hex_byte(command)?,
                });
            }
            (_, Some(arg)) => {
                return Err(ProtocolError::invalid(format!(
                    "{} takes no argument, got {}",
                    function, arg
                )))
            }
            (_, None) => {}
        }

        Command::try_new(house, units, function, percent, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(numbers: &[u8]) -> Vec<Unit> {
        numbers.iter().filter_map(|&n| Unit::from_number(n)).collect()
    }

    #[test]
    fn test_units_are_order_insensitive() {
        let a = Command::on(House::E, units(&[1, 2]));
        let b = Command::on(House::E, units(&[2, 1, 2]));
        assert_eq!(a, b);
        assert_eq!(a.units().len(), 2);
    }

    #[test]
    fn test_noop_detection() {
        assert!(Command::on(House::A, Vec::new()).is_noop());
        assert!(Command::dim(House::A, 0, units(&[1])).is_noop());
        assert!(Command::ext(House::A, 1, 2, Vec::new()).is_noop());
        assert!(!Command::all_lights_on(House::A).is_noop());
        assert!(!Command::bright(House::A, 5, units(&[3])).is_noop());
    }

    #[test]
    fn test_try_new_validation() {
        assert_eq!(
            Command::try_new(House::A, units(&[1]), FunctionType::StatusOn, None, None),
            Err(ProtocolError::UnsupportedFunction { id: 14 })
        );
        assert!(Command::try_new(House::A, units(&[1]), FunctionType::Dim, None, None).is_err());
        assert!(Command::try_new(House::A, units(&[1]), FunctionType::Ext, None, None).is_err());

        let house_level =
            Command::try_new(House::A, units(&[1, 2]), FunctionType::AllLightsOff, Some(5), None)
                .unwrap();
        assert_eq!(house_level, Command::all_lights_off(House::A));

        let clamped =
            Command::try_new(House::B, units(&[4]), FunctionType::Bright, Some(150), None).unwrap();
        assert_eq!(clamped.percent(), Some(100));
    }

    #[test]
    fn test_to_entries() {
        let cmd = Command::dim(House::B, 99, units(&[5, 1]));
        assert_eq!(
            cmd.to_entries(),
            vec![
                Entry::Address {
                    house: House::B,
                    unit: Unit::U1
                },
                Entry::Address {
                    house: House::B,
                    unit: Unit::U5
                },
                Entry::Dim {
                    house: House::B,
                    function: FunctionType::Dim,
                    percent: 99
                },
            ]
        );
        assert_eq!(
            Command::all_units_off(House::C).to_entries(),
            vec![Entry::Function {
                house: House::C,
                function: FunctionType::AllUnitsOff
            }]
        );
        assert!(Command::off(House::C, Vec::new()).to_entries().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::on(House::A, units(&[1, 2])).to_string(), "A1,2 on");
        assert_eq!(
            Command::dim(House::B, 99, units(&[1, 2, 3, 4, 5, 6, 7])).to_string(),
            "B1-7 dim 99"
        );
        assert_eq!(Command::all_lights_off(House::C).to_string(), "C all_lights_off");
        assert_eq!(Command::ext(House::D, 0x31, 0x01, units(&[5])).to_string(), "D5 ext 31:01");
        assert_eq!(
            Command::off(House::P, units(&[1, 3, 4, 5, 9, 10])).to_string(),
            "P1,3-5,9,10 off"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "A1,2 on".parse::<Command>().unwrap(),
            Command::on(House::A, units(&[1, 2]))
        );
        assert_eq!(
            "b1-7 DIM 99%".parse::<Command>().unwrap(),
            Command::dim(House::B, 99, units(&[1, 2, 3, 4, 5, 6, 7]))
        );
        assert_eq!(
            "C all_lights_off".parse::<Command>().unwrap(),
            Command::all_lights_off(House::C)
        );
        assert_eq!(
            "D5 ext 0x31:01".parse::<Command>().unwrap(),
            Command::ext(House::D, 0x31, 0x01, units(&[5]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("A1".parse::<Command>().is_err());
        assert!("A1 on 50".parse::<Command>().is_err());
        assert!("A7-3 off".parse::<Command>().is_err());
        assert!("A1 dim".parse::<Command>().is_err());
        assert!("A17 on".parse::<Command>().is_err());
        assert!("A1 hail_ack".parse::<Command>().is_err());
        assert!("A1 ext 31".parse::<Command>().is_err());
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let commands = [
            Command::on(House::E, units(&[1, 2])),
            Command::bright(House::F, 40, units(&[16])),
            Command::all_units_off(House::M),
            Command::ext(House::G, 0xFF, 0x00, units(&[2, 3, 4])),
        ];
        for cmd in commands {
            assert_eq!(cmd.to_string().parse::<Command>().unwrap(), cmd);
        }
    }
}
