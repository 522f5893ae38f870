//! Strongly typed field values for the MCP346x command protocol.
//!
//! These enums map directly to datasheet field encodings and are packed into the command
//! and register bitfields in [`registers`](crate::registers).
//!
//! # Examples
//!
//! ```rust
//! use mcp346x::params::{DeviceAddress, MuxInput};
//!
//! let address = DeviceAddress::from(0b11);
//! assert_eq!(address, DeviceAddress::A3);
//! assert_eq!(MuxInput::Agnd.bits(), 0b1000);
//! ```

use modular_bitfield::prelude::Specifier;

/// Two-bit device address carried in bits 7–6 of every command byte.
///
/// Lets up to four chips share one bus; the value is fixed at manufacture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum DeviceAddress {
    /// Address `0b00`.
    A0 = 0b00,
    /// Address `0b01`, the factory default.
    A1 = 0b01,
    /// Address `0b10`.
    A2 = 0b10,
    /// Address `0b11`.
    A3 = 0b11,
}

impl DeviceAddress {
    /// Returns the raw two-bit address.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::A1
    }
}

impl From<u8> for DeviceAddress {
    /// Keeps the low two bits; anything wider is truncated.
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::A0,
            0b01 => Self::A1,
            0b10 => Self::A2,
            _ => Self::A3,
        }
    }
}

/// Fast command opcodes (bits 5–0 of a fast command byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 6]
pub enum FastCommand {
    /// Starts a conversion (or restarts one in progress).
    ConversionStart = 0b1010_00,
    /// Enters standby mode.
    Standby = 0b1011_00,
    /// Enters shutdown mode.
    Shutdown = 0b1100_00,
    /// Enters full shutdown mode, including the configuration registers.
    FullShutdown = 0b1101_00,
    /// Full device reset, restoring every register to its power-on default.
    FullReset = 0b1110_00,
}

/// Transfer type selector (bits 1–0 of a register command byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum TransferType {
    /// Reads a single register without advancing the address.
    StaticRead = 0b01,
    /// Writes starting at the addressed register, auto-incrementing.
    IncrementalWrite = 0b10,
    /// Reads starting at the addressed register, auto-incrementing.
    IncrementalRead = 0b11,
}

/// Analog inputs selectable for either side of the `MUX` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MuxInput {
    Ch0 = 0b0000,
    Ch1 = 0b0001,
    Ch2 = 0b0010,
    Ch3 = 0b0011,
    Ch4 = 0b0100,
    Ch5 = 0b0101,
    Ch6 = 0b0110,
    Ch7 = 0b0111,
    /// Analog ground; the negative side of a single-ended conversion.
    Agnd = 0b1000,
    /// Analog supply.
    Avdd = 0b1001,
    /// Positive reference input.
    RefInPos = 0b1011,
    /// Negative reference input.
    RefInNeg = 0b1100,
    /// Internal temperature sensor diode P.
    TempDiodeP = 0b1101,
    /// Internal temperature sensor diode M.
    TempDiodeM = 0b1110,
    /// Internal common-mode voltage.
    Vcm = 0b1111,
}

impl MuxInput {
    /// Returns the four-bit `MUX` field encoding.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}
