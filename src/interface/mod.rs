//! Bus interface abstraction for the MCP346x driver.
//!
//! Every frame handed to an interface is one complete chip-select window: select is
//! asserted before the first byte and released right after the last, with nothing else
//! clocked in between.

pub mod bus;
pub mod spi;

/// Abstraction over the low-level bus access required by the driver.
pub trait Mcp346xInterface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Clocks `frame` out, discarding whatever is clocked in.
    fn write(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Clocks `frame` out and overwrites it with the bytes clocked in during the same cycles.
    fn transfer_in_place(&mut self, frame: &mut [u8]) -> core::result::Result<(), Self::Error>;
}
