//! Configuration primitives for the MCP346x driver.

use crate::params::{DeviceAddress, MuxInput};

/// User-facing configuration for one MCP346x chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Device address bits, as programmed at the factory.
    pub address: DeviceAddress,
    /// Negative input used by single-ended conversions.
    pub negative_input: MuxInput,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the device address.
    pub fn address(mut self, address: DeviceAddress) -> Self {
        self.config.address = address;
        self
    }

    /// Overrides the negative input of single-ended conversions.
    pub fn negative_input(mut self, input: MuxInput) -> Self {
        self.config.negative_input = input;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DeviceAddress::default(),
            negative_input: MuxInput::Agnd,
        }
    }
}

impl From<DeviceAddress> for Config {
    fn from(address: DeviceAddress) -> Self {
        Self::new().address(address).build()
    }
}
