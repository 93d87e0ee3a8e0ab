// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

use serde::Deserialize;

use crate::clock::ClockFlags;
use crate::constants::{MASK_BITS, MAX_ENTRIES_PER_BUFFER};
use crate::error::{ProtocolError, Result};
use crate::types::House;

/// Settings for the code that sits between an application and the interface.
///
/// Deserializes from a TOML table; every field is optional:
///
/// ```toml
/// monitored_house = "E"
/// max_entries_per_buffer = 7
/// clear_battery_timer = true
/// event_capacity = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// House whose status the interface tracks; sent in every clock frame.
    pub monitored_house: House,
    /// Entry limit per transmit buffer (1-8, default 7)
    pub max_entries_per_buffer: usize,
    /// Clock frame flag: restart the battery timer
    pub clear_battery_timer: bool,
    /// Clock frame flag: forget the monitored house's status
    pub clear_monitored_status: bool,
    /// Clock frame flag: cancel pending timer events
    pub purge_timer: bool,
    /// Capacity of the broadcast channel carrying reconstructed commands
    pub event_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            monitored_house: House::A,
            max_entries_per_buffer: MAX_ENTRIES_PER_BUFFER,
            clear_battery_timer: false,
            clear_monitored_status: false,
            purge_timer: false,
            event_capacity: 64,
        }
    }
}

impl BridgeConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ProtocolError::InvalidConfig {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries_per_buffer == 0 || self.max_entries_per_buffer > MASK_BITS {
            return Err(ProtocolError::InvalidConfig {
                details: format!(
                    "max_entries_per_buffer must be 1-{}, got {}",
                    MASK_BITS, self.max_entries_per_buffer
                ),
            });
        }
        if self.event_capacity == 0 {
            return Err(ProtocolError::InvalidConfig {
                details: "event_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The clock frame flags these settings ask for.
    pub fn clock_flags(&self) -> ClockFlags {
        let mut flags = ClockFlags::empty();
        flags.set(ClockFlags::CLEAR_BATTERY_TIMER, self.clear_battery_timer);
        flags.set(ClockFlags::CLEAR_MONITORED_STATUS, self.clear_monitored_status);
        flags.set(ClockFlags::PURGE_TIMER, self.purge_timer);
        flags
    }
}

/// Builder for BridgeConfig.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn monitored_house(mut self, house: House) -> Self {
        self.config.monitored_house = house;
        self
    }

    pub fn max_entries_per_buffer(mut self, entries: usize) -> Self {
        self.config.max_entries_per_buffer = entries;
        self
    }

    pub fn clear_battery_timer(mut self, clear: bool) -> Self {
        self.config.clear_battery_timer = clear;
        self
    }

    pub fn clear_monitored_status(mut self, clear: bool) -> Self {
        self.config.clear_monitored_status = clear;
        self
    }

    pub fn purge_timer(mut self, purge: bool) -> Self {
        self.config.purge_timer = purge;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn build(self) -> BridgeConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = BridgeConfig::builder()
            .monitored_house(House::E)
            .max_entries_per_buffer(4)
            .purge_timer(true)
            .event_capacity(8)
            .build();

        assert_eq!(config.monitored_house, House::E);
        assert_eq!(config.max_entries_per_buffer, 4);
        assert!(config.purge_timer);
        assert!(!config.clear_battery_timer);
        assert_eq!(config.event_capacity, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = BridgeConfig::builder().build();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.max_entries_per_buffer, 7);
        assert_eq!(config.clock_flags(), ClockFlags::empty());
    }

    #[test]
    fn test_clock_flags() {
        let config = BridgeConfig::builder()
            .clear_battery_timer(true)
            .clear_monitored_status(true)
            .purge_timer(true)
            .build();
        assert_eq!(config.clock_flags(), ClockFlags::all());
    }

    #[test]
    fn test_from_toml() {
        let config = BridgeConfig::from_toml_str(
            r#"
            monitored_house = "e"
            max_entries_per_buffer = 5
            clear_battery_timer = true
            "#,
        )
        .unwrap();
        assert_eq!(config.monitored_house, House::E);
        assert_eq!(config.max_entries_per_buffer, 5);
        assert!(config.clear_battery_timer);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(BridgeConfig::from_toml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        for text in [
            "max_entries_per_buffer = 9",
            "max_entries_per_buffer = 0",
            "event_capacity = 0",
            "monitored_house = \"Q\"",
            "unknown_field = 1",
        ] {
            assert!(
                matches!(
                    BridgeConfig::from_toml_str(text),
                    Err(ProtocolError::InvalidConfig { .. })
                ),
                "accepted {}",
                text
            );
        }
    }
}
