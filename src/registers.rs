//! Register map and command byte layouts for the MCP346x.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{DeviceAddress, FastCommand, MuxInput, TransferType};

/// Registers addressed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum Register {
    /// `ADCDATA` (address `0x0`), latest conversion result.
    AdcData = 0x0,
    /// `IRQ` (address `0x5`), interrupt configuration and status.
    Irq = 0x5,
    /// `MUX` (address `0x6`), input channel selection.
    Mux = 0x6,
}

impl Register {
    /// Register address as documented in the datasheet.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Payload width in bytes. Reads always request exactly this many bytes.
    pub const fn width(self) -> usize {
        match self {
            // 16-bit output with the default DATA_FORMAT.
            Self::AdcData => 2,
            Self::Irq | Self::Mux => 1,
        }
    }
}

/// Single-byte fast command: `[7:6]` device address, `[5:0]` opcode.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastCommandByte {
    pub opcode: FastCommand,
    pub address: DeviceAddress,
}

impl FastCommandByte {
    /// Packs `command` for the chip at `address`.
    pub fn encode(address: DeviceAddress, command: FastCommand) -> u8 {
        Self::new()
            .with_opcode(command)
            .with_address(address)
            .into_bytes()[0]
    }
}

/// Register access command: `[7:6]` device address, `[5:2]` register, `[1:0]` transfer type.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCommandByte {
    pub transfer: TransferType,
    pub register: Register,
    pub address: DeviceAddress,
}

impl RegisterCommandByte {
    /// Packs a `transfer` of `register` on the chip at `address`.
    pub fn encode(address: DeviceAddress, register: Register, transfer: TransferType) -> u8 {
        Self::new()
            .with_transfer(transfer)
            .with_register(register)
            .with_address(address)
            .into_bytes()[0]
    }
}

/// Bitfield representation of the `IRQ` register (address `0x5`).
///
/// The three status flags are active low: a cleared bit reports the event.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Irq {
    // Conversion start interrupt output enable (bit 0).
    pub en_stp: bool,
    // Fast command enable (bit 1).
    pub en_fastcmd: bool,
    // IRQ pin mode selection (bits 3:2).
    pub irq_mode: B2,
    // Power-on reset status, active low (bit 4).
    pub por_status: bool,
    // CRC checksum error on configuration registers, active low (bit 5).
    pub crccfg_status: bool,
    // Data ready status, active low (bit 6).
    pub dr_status: bool,
    #[skip]
    __: B1,
}

impl Irq {
    /// Returns `true` when a new conversion result is waiting in `ADCDATA`.
    pub fn data_ready(&self) -> bool {
        !self.dr_status()
    }

    /// Returns `true` when a power-on reset has occurred since the flag was last cleared.
    pub fn power_on_reset(&self) -> bool {
        !self.por_status()
    }
}

impl From<u8> for Irq {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Irq> for u8 {
    fn from(value: Irq) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `MUX` register (address `0x6`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mux {
    // Negative input selection (bits 3:0).
    pub vin_m: B4,
    // Positive input selection (bits 7:4).
    pub vin_p: B4,
}

impl Mux {
    /// Selects `positive` against `negative`. Only the low four bits of `positive` are used.
    pub fn single_ended(positive: u8, negative: MuxInput) -> Self {
        Self::new()
            .with_vin_p(positive & 0x0F)
            .with_vin_m(negative.bits())
    }
}

impl From<u8> for Mux {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Mux> for u8 {
    fn from(value: Mux) -> Self {
        value.into_bytes()[0]
    }
}
