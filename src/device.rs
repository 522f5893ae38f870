//! High-level MCP346x device driver implementation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::Mcp346xInterface;
use crate::interface::bus::{BusError, SpiBusInterface};
use crate::interface::spi::SpiInterface;
use crate::log::{debug, trace};
use crate::params::{DeviceAddress, FastCommand, TransferType};
use crate::registers::{FastCommandByte, Irq, Mux, Register, RegisterCommandByte};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{SpiBus, SpiDevice};

// Widest register the driver reads (`ADCDATA`), in bytes.
const MAX_REGISTER_WIDTH: usize = 2;

/// Blocking driver for one MCP3461/2/4 ADC.
///
/// A conversion cycle is driven by the caller: [`convert`](Self::convert), then poll
/// [`data_ready`](Self::data_ready) (or wait on the IRQ line), then
/// [`read_data_s16`](Self::read_data_s16). The driver does not track which phase the chip
/// is in; reading before the conversion completes returns whatever the chip holds.
pub struct Mcp346x<IFACE, IRQ> {
    interface: IFACE,
    data_ready: IRQ,
    config: Config,
}

impl<IFACE, IRQ> Mcp346x<IFACE, IRQ> {
    // ==================================================================
    // == Driver Ownership ==============================================
    // ==================================================================
    /// Consumes the driver and returns the owned interface and data-ready pin.
    pub fn release(self) -> (IFACE, IRQ) {
        (self.interface, self.data_ready)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration the driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Device address encoded into every command byte.
    pub fn address(&self) -> DeviceAddress {
        self.config.address
    }
}

impl<SPI, CS, IRQ> Mcp346x<SpiBusInterface<SPI, CS>, IRQ>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQ: InputPin,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Builds a driver that owns the whole bus and toggles `cs` itself.
    ///
    /// `cs` is driven high before anything else is clocked. `data_ready` must already be
    /// configured by the HAL as an input with pull-up enabled; the chip only ever pulls it low.
    pub fn new_spi_bus(
        spi: SPI,
        cs: CS,
        data_ready: IRQ,
        address: DeviceAddress,
    ) -> Result<Self, BusError<SPI::Error, CS::Error>, IRQ::Error> {
        let interface = SpiBusInterface::new(spi, cs).map_err(Error::Interface)?;
        Self::new(interface, data_ready, Config::from(address))
    }

    /// Releases the driver, returning the SPI bus, chip-select pin and data-ready pin.
    pub fn release_spi_bus(self) -> (SPI, CS, IRQ) {
        let (iface, data_ready) = self.release();
        let (spi, cs) = iface.release();
        (spi, cs, data_ready)
    }
}

impl<SPI, IRQ> Mcp346x<SpiInterface<SPI>, IRQ>
where
    SPI: SpiDevice,
    IRQ: InputPin,
{
    /// Convenience constructor for `SpiDevice` transports that manage chip select.
    pub fn new_spi(
        spi: SPI,
        data_ready: IRQ,
        address: DeviceAddress,
    ) -> Result<Self, SPI::Error, IRQ::Error> {
        Self::new(SpiInterface::new(spi), data_ready, Config::from(address))
    }

    /// Releases the driver, returning the SPI device and data-ready pin.
    pub fn release_spi(self) -> (SPI, IRQ) {
        let (iface, data_ready) = self.release();
        (iface.release(), data_ready)
    }
}

impl<IFACE, IRQ, CommE, PinE> Mcp346x<IFACE, IRQ>
where
    IFACE: Mcp346xInterface<Error = CommE>,
    IRQ: InputPin<Error = PinE>,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Creates a driver and fully resets the chip before handing it back.
    pub fn new(interface: IFACE, data_ready: IRQ, config: Config) -> Result<Self, CommE, PinE> {
        let mut device = Self {
            interface,
            data_ready,
            config,
        };
        device.reset()?;
        Ok(device)
    }

    /// Issues a full reset and disables the conversion-start interrupt.
    ///
    /// Every register returns to its power-on default; `IRQ.EN_STP` is then cleared
    /// whatever its default was. Safe to call again at any time to re-initialize the chip.
    pub fn reset(&mut self) -> Result<(), CommE, PinE> {
        self.fast_command(FastCommand::FullReset)?;

        let irq = Irq::from(self.read_register8(Register::Irq)?);
        debug!("reset: IRQ={=u8:#x}", u8::from(irq));
        self.write_register8(Register::Irq, irq.with_en_stp(false).into())
    }

    // ==================================================================
    // == Conversion ====================================================
    // ==================================================================
    /// Starts a single-ended conversion of `channel` against the configured negative input.
    ///
    /// Only the low four bits of `channel` reach the `MUX` register.
    pub fn convert(&mut self, channel: u8) -> Result<(), CommE, PinE> {
        let mux = Mux::single_ended(channel, self.config.negative_input);
        trace!("convert: MUX={=u8:#x}", u8::from(mux));
        self.write_register8(Register::Mux, mux.into())?;
        self.fast_command(FastCommand::ConversionStart)
    }

    /// Reads the latest conversion result as a signed 16-bit sample.
    pub fn read_data_s16(&mut self) -> Result<i16, CommE, PinE> {
        let raw = self.read_register16(Register::AdcData)?;
        // Two's complement: 0x8000..=0xFFFF map to -32768..=-1.
        Ok(raw as i16)
    }

    /// Returns `true` while the data-ready line is held low by the chip.
    ///
    /// A single instantaneous read; nothing is latched or debounced.
    pub fn data_ready(&mut self) -> Result<bool, CommE, PinE> {
        self.data_ready.is_low().map_err(Error::Pin)
    }

    /// Reads the `IRQ` register, including its active-low status flags.
    pub fn irq_status(&mut self) -> Result<Irq, CommE, PinE> {
        Ok(Irq::from(self.read_register8(Register::Irq)?))
    }

    // ==================================================================
    // == Power States ==================================================
    // ==================================================================
    /// Places the ADC in standby; the next conversion start wakes it.
    pub fn standby(&mut self) -> Result<(), CommE, PinE> {
        debug!("standby");
        self.fast_command(FastCommand::Standby)
    }

    /// Shuts the ADC down, keeping the configuration registers.
    pub fn shutdown(&mut self) -> Result<(), CommE, PinE> {
        debug!("shutdown");
        self.fast_command(FastCommand::Shutdown)
    }

    /// Full shutdown, including the register map. Call [`reset`](Self::reset) to recover.
    pub fn full_shutdown(&mut self) -> Result<(), CommE, PinE> {
        debug!("full shutdown");
        self.fast_command(FastCommand::FullShutdown)
    }

    // ==================================================================
    // == Command Framing ===============================================
    // ==================================================================
    fn fast_command(&mut self, command: FastCommand) -> Result<(), CommE, PinE> {
        let frame = [FastCommandByte::encode(self.config.address, command)];
        self.interface.write(&frame).map_err(Error::Interface)
    }

    fn write_register8(&mut self, register: Register, value: u8) -> Result<(), CommE, PinE> {
        let frame = [
            RegisterCommandByte::encode(
                self.config.address,
                register,
                TransferType::IncrementalWrite,
            ),
            value,
        ];
        self.interface.write(&frame).map_err(Error::Interface)
    }

    fn read_register8(&mut self, register: Register) -> Result<u8, CommE, PinE> {
        debug_assert_eq!(register.width(), 1);
        Ok(self.read_register(register)? as u8)
    }

    fn read_register16(&mut self, register: Register) -> Result<u16, CommE, PinE> {
        debug_assert_eq!(register.width(), 2);
        self.read_register(register)
    }

    /// Reads `register.width()` bytes, returning them assembled big-endian.
    fn read_register(&mut self, register: Register) -> Result<u16, CommE, PinE> {
        let mut buf = [0u8; 1 + MAX_REGISTER_WIDTH];
        let frame = &mut buf[..=register.width()];
        frame[0] = RegisterCommandByte::encode(
            self.config.address,
            register,
            TransferType::IncrementalRead,
        );

        self.interface
            .transfer_in_place(frame)
            .map_err(Error::Interface)?;

        // frame[0] was clocked in alongside the command byte and carries no register data.
        Ok(frame[1..]
            .iter()
            .fold(0u16, |value, &byte| value << 8 | u16::from(byte)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MuxInput;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    const CMD_FULL_RESET: u8 = 0b1110_00;
    const CMD_CONV_START: u8 = 0b1010_00;
    const INC_WRITE: u8 = 0b10;
    const INC_READ: u8 = 0b11;
    const REG_ADCDATA: u8 = 0x0;
    const REG_IRQ: u8 = 0x5;
    const REG_MUX: u8 = 0x6;

    type Driver = Mcp346x<SpiBusInterface<SpiMock<u8>, PinMock>, PinMock>;

    fn command(address: u8, register: u8, transfer: u8) -> u8 {
        address << 6 | register << 2 | transfer
    }

    /// One chip-select window as seen on the wire.
    enum Frame {
        Write(Vec<u8>),
        Read(Vec<u8>, Vec<u8>),
    }

    impl Frame {
        fn transaction(self) -> SpiTransaction<u8> {
            match self {
                Frame::Write(frame) => SpiTransaction::write_vec(frame),
                Frame::Read(frame, response) => SpiTransaction::transfer_in_place(frame, response),
            }
        }

        // Exclusive bus: every frame is followed by a flush before select is released.
        fn bus_transactions(frames: Vec<Frame>) -> Vec<SpiTransaction<u8>> {
            frames
                .into_iter()
                .flat_map(|frame| [frame.transaction(), SpiTransaction::flush()])
                .collect()
        }

        fn device_transactions(frames: Vec<Frame>) -> Vec<SpiTransaction<u8>> {
            frames
                .into_iter()
                .flat_map(|frame| {
                    [
                        SpiTransaction::transaction_start(),
                        frame.transaction(),
                        SpiTransaction::transaction_end(),
                    ]
                })
                .collect()
        }
    }

    fn reset_frames(address: u8, irq: u8) -> Vec<Frame> {
        vec![
            Frame::Write(vec![address << 6 | CMD_FULL_RESET]),
            Frame::Read(vec![command(address, REG_IRQ, INC_READ), 0x00], vec![0x00, irq]),
            Frame::Write(vec![command(address, REG_IRQ, INC_WRITE), irq & 0xFE]),
        ]
    }

    fn convert_frames(address: u8, mux: u8) -> Vec<Frame> {
        vec![
            Frame::Write(vec![command(address, REG_MUX, INC_WRITE), mux]),
            Frame::Write(vec![address << 6 | CMD_CONV_START]),
        ]
    }

    fn adcdata_frame(address: u8, raw: u16) -> Frame {
        let [high, low] = raw.to_be_bytes();
        Frame::Read(
            vec![command(address, REG_ADCDATA, INC_READ), 0x00, 0x00],
            vec![0xA5, high, low],
        )
    }

    struct Harness {
        spi: SpiMock<u8>,
        cs: PinMock,
        data_ready: PinMock,
    }

    impl Harness {
        fn new(frames: Vec<Frame>, data_ready: &[PinTransaction]) -> Self {
            let mut cs = vec![PinTransaction::set(State::High)];
            for _ in 0..frames.len() {
                cs.push(PinTransaction::set(State::Low));
                cs.push(PinTransaction::set(State::High));
            }

            Self {
                spi: SpiMock::new(&Frame::bus_transactions(frames)),
                cs: PinMock::new(&cs),
                data_ready: PinMock::new(data_ready),
            }
        }

        fn driver(&self, address: DeviceAddress) -> Driver {
            Mcp346x::new_spi_bus(
                self.spi.clone(),
                self.cs.clone(),
                self.data_ready.clone(),
                address,
            )
            .unwrap()
        }

        fn done(mut self) {
            self.spi.done();
            self.cs.done();
            self.data_ready.done();
        }
    }

    #[test]
    fn construction_resets_and_clears_conversion_start_interrupt() {
        for irq in [0x00, 0x01, 0x73, 0x77, 0xFE, 0xFF] {
            let harness = Harness::new(reset_frames(0b01, irq), &[]);
            let device = harness.driver(DeviceAddress::A1);
            assert_eq!(device.address(), DeviceAddress::A1);
            harness.done();
        }
    }

    #[test]
    fn reset_can_be_reissued() {
        let mut frames = reset_frames(0b10, 0x33);
        frames.extend(reset_frames(0b10, 0x77));
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A2);
        device.reset().unwrap();

        harness.done();
    }

    #[test]
    fn convert_writes_mux_then_starts_conversion() {
        let mut frames = reset_frames(0b01, 0x77);
        frames.extend(convert_frames(0b01, 0x38));
        frames.extend(convert_frames(0b01, 0x08));
        frames.extend(convert_frames(0b01, 0x78));
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A1);
        device.convert(3).unwrap();
        device.convert(0).unwrap();
        device.convert(7).unwrap();

        harness.done();
    }

    #[test]
    fn convert_truncates_wide_channel_values() {
        let mut frames = reset_frames(0b01, 0x77);
        frames.extend(convert_frames(0b01, 0x28));
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A1);
        device.convert(0x12).unwrap();

        harness.done();
    }

    #[test]
    fn address_only_changes_top_bits() {
        for (address, bits) in [(DeviceAddress::A0, 0b00), (DeviceAddress::A3, 0b11)] {
            let mut frames = reset_frames(bits, 0x77);
            frames.extend(convert_frames(bits, 0x58));
            let harness = Harness::new(frames, &[]);

            let mut device = harness.driver(address);
            device.convert(5).unwrap();

            harness.done();
        }
        assert_eq!(command(0b11, REG_MUX, INC_WRITE) ^ command(0, REG_MUX, INC_WRITE), 0xC0);
    }

    #[test]
    fn read_data_s16_sign_extends() {
        let cases: [(u16, i16); 7] = [
            (0x0000, 0),
            (0x0001, 1),
            (0x1234, 0x1234),
            (0x7FFF, 32767),
            (0x8000, -32768),
            (0xFFFE, -2),
            (0xFFFF, -1),
        ];

        let mut frames = reset_frames(0b01, 0x77);
        for (raw, _) in cases {
            frames.push(adcdata_frame(0b01, raw));
        }
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A1);
        for (raw, expected) in cases {
            assert_eq!(device.read_data_s16().unwrap(), expected, "raw {raw:#06x}");
        }

        harness.done();
    }

    #[test]
    fn register_reads_discard_first_received_byte() {
        let mut frames = reset_frames(0b01, 0x77);
        for status in [0x00, 0xFF, 0x3F] {
            frames.push(Frame::Read(
                vec![command(0b01, REG_IRQ, INC_READ), 0x00],
                vec![status, 0x37],
            ));
        }
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A1);
        for _ in 0..3 {
            let irq = device.irq_status().unwrap();
            assert_eq!(u8::from(irq), 0x37);
            assert!(irq.data_ready());
        }

        harness.done();
    }

    #[test]
    fn data_ready_follows_active_low_line() {
        let harness = Harness::new(
            reset_frames(0b01, 0x77),
            &[
                PinTransaction::get(State::High),
                PinTransaction::get(State::Low),
                PinTransaction::get(State::High),
            ],
        );

        let mut device = harness.driver(DeviceAddress::A1);
        assert!(!device.data_ready().unwrap());
        assert!(device.data_ready().unwrap());
        assert!(!device.data_ready().unwrap());

        harness.done();
    }

    #[test]
    fn full_conversion_cycle() {
        let mut frames = reset_frames(0b01, 0x77);
        frames.extend(convert_frames(0b01, 0x18));
        frames.push(adcdata_frame(0b01, 0xFC18));
        let harness = Harness::new(
            frames,
            &[
                PinTransaction::get(State::High),
                PinTransaction::get(State::Low),
            ],
        );

        let mut device = harness.driver(DeviceAddress::A1);
        device.convert(1).unwrap();
        while !device.data_ready().unwrap() {}
        assert_eq!(device.read_data_s16().unwrap(), -1000);

        harness.done();
    }

    #[test]
    fn power_state_fast_commands() {
        let mut frames = reset_frames(0b01, 0x77);
        frames.push(Frame::Write(vec![0b01_101100]));
        frames.push(Frame::Write(vec![0b01_110000]));
        frames.push(Frame::Write(vec![0b01_110100]));
        let harness = Harness::new(frames, &[]);

        let mut device = harness.driver(DeviceAddress::A1);
        device.standby().unwrap();
        device.shutdown().unwrap();
        device.full_shutdown().unwrap();

        harness.done();
    }

    #[test]
    fn configured_negative_input_reaches_mux() {
        let mut frames = reset_frames(0b00, 0x01);
        frames.extend(convert_frames(0b00, 0x2F));
        let harness = Harness::new(frames, &[]);

        let config = Config::new()
            .address(DeviceAddress::A0)
            .negative_input(MuxInput::Vcm)
            .build();
        let interface = SpiBusInterface::new(harness.spi.clone(), harness.cs.clone()).unwrap();
        let mut device = Mcp346x::new(interface, harness.data_ready.clone(), config).unwrap();
        device.convert(2).unwrap();

        let (_spi, _cs, _data_ready) = device.release_spi_bus();
        harness.done();
    }

    #[test]
    fn spi_device_transport_resets_on_construction() {
        let expectations = Frame::device_transactions(reset_frames(0b11, 0xFF));
        let mut spi = SpiMock::new(&expectations);
        let mut data_ready = PinMock::new(&[PinTransaction::get(State::Low)]);

        let mut device =
            Mcp346x::new_spi(spi.clone(), data_ready.clone(), DeviceAddress::A3).unwrap();
        assert!(device.data_ready().unwrap());

        let (_spi, _data_ready) = device.release_spi();
        spi.done();
        data_ready.done();
    }

    struct FailingInterface;

    impl Mcp346xInterface for FailingInterface {
        type Error = ();

        fn write(&mut self, _frame: &[u8]) -> core::result::Result<(), Self::Error> {
            Err(())
        }

        fn transfer_in_place(&mut self, _frame: &mut [u8]) -> core::result::Result<(), Self::Error> {
            Err(())
        }
    }

    #[test]
    fn transport_faults_abort_construction() {
        let mut data_ready = PinMock::new(&[]);

        let result = Mcp346x::new(FailingInterface, data_ready.clone(), Config::default());
        assert!(matches!(result, Err(Error::Interface(()))));

        data_ready.done();
    }
}
