//! `#![no_std]` driver for the Microchip MCP3461/2/4 family of delta-sigma ADCs.
//!
//! The chip is driven through its SPI command protocol: single-byte fast commands
//! (reset, conversion start, power states) and incrementing register reads and writes.
//! A dedicated active-low data-ready line signals when a conversion result is available.
#![cfg_attr(not(test), no_std)]

mod error;

pub mod config;
pub mod device;
pub mod interface;
mod log;
pub mod params;
pub mod registers;

pub use crate::config::Config;
pub use crate::device::Mcp346x;
pub use crate::error::{Error, Result};
pub use crate::params::{DeviceAddress, MuxInput};
