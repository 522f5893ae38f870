//! Interface over an exclusively owned `SpiBus` with a separate chip-select pin.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::Mcp346xInterface;

/// Fault raised by [`SpiBusInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<SpiE, CsE> {
    /// The SPI bus reported an error.
    Spi(SpiE),
    /// The chip-select pin could not be driven.
    ChipSelect(CsE),
}

/// Drives the chip-select line itself around every frame.
///
/// Select is active low. The bus is flushed before select is released, so the last byte
/// is always fully clocked out inside the window.
pub struct SpiBusInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiBusInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Takes ownership of the bus and chip-select pin, leaving the chip deselected.
    pub fn new(spi: SPI, mut cs: CS) -> core::result::Result<Self, BusError<SPI::Error, CS::Error>> {
        cs.set_high().map_err(BusError::ChipSelect)?;
        Ok(Self { spi, cs })
    }

    fn framed<F>(&mut self, op: F) -> core::result::Result<(), BusError<SPI::Error, CS::Error>>
    where
        F: FnOnce(&mut SPI) -> core::result::Result<(), SPI::Error>,
    {
        self.cs.set_low().map_err(BusError::ChipSelect)?;
        let result = op(&mut self.spi).and_then(|()| self.spi.flush());
        // Select is released even when the transfer failed.
        self.cs.set_high().map_err(BusError::ChipSelect)?;
        result.map_err(BusError::Spi)
    }
}

impl<SPI, CS> SpiBusInterface<SPI, CS> {
    /// Provides mutable access to the wrapped SPI bus.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the bus and chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Mcp346xInterface for SpiBusInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = BusError<SPI::Error, CS::Error>;

    fn write(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error> {
        self.framed(|spi| spi.write(frame))
    }

    fn transfer_in_place(&mut self, frame: &mut [u8]) -> core::result::Result<(), Self::Error> {
        self.framed(|spi| spi.transfer_in_place(frame))
    }
}
