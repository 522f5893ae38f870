//! Error handling primitives for the MCP346x driver.

/// Crate-wide result type alias.
pub type Result<T, CommE, PinE> = core::result::Result<T, Error<CommE, PinE>>;

/// Error variants produced by the driver.
///
/// The driver performs no validation of its own; every variant carries a fault raised by
/// one of the collaborators handed to it at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<CommE, PinE> {
    /// Any error reported by the underlying bus interface, chip select included.
    Interface(CommE),
    /// The data-ready input pin could not be read.
    Pin(PinE),
}
