//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.
//!
//! Chip select belongs to the `SpiDevice` implementation, which makes this the interface
//! to use when the bus is shared through `embedded-hal-bus` or a HAL-provided device.

use embedded_hal::spi::{Operation, SpiDevice};

use super::Mcp346xInterface;

/// SPI-based interface implementation for the MCP346x driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Mcp346xInterface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error> {
        self.spi.transaction(&mut [Operation::Write(frame)])
    }

    fn transfer_in_place(&mut self, frame: &mut [u8]) -> core::result::Result<(), Self::Error> {
        self.spi.transaction(&mut [Operation::TransferInPlace(frame)])
    }
}
