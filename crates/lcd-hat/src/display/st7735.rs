//! ST7735 / ST7735S TFT driver
//!
//! Blocking driver over embedded-hal 1.0 traits, used by the Linux backend
//! for the 1.44" and 1.8" HAT panels.
//!
//! | Signal | Pi (BCM)     | Direction      |
//! |--------|--------------|----------------|
//! | SCLK   | GPIO11       | Host → Display |
//! | MOSI   | GPIO10       | Host → Display |
//! | CS     | `SpiDevice`  | Host → Display |
//! | DC     | `LCD_DC`     | Host → Display |
//! | RST    | `LCD_RST`    | Host → Display |
//! | BL     | `LCD_BL`     | Host → Display |
//!
//! Pixels go out as RGB565, big-endian, inside a column/row window that
//! includes the panel's offset into controller RAM. Rotation is done by the
//! controller (MADCTL); the offset is configured in native axes and swapped
//! for the 90° and 270° exchanges.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use platform::{Frame, MinimalParams, Panel, PanelError, Rotation};

// ---------------------------------------------------------------------------
// Command set
// ---------------------------------------------------------------------------

/// ST7735 command codes used by this driver.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Software reset; wait 150 ms.
    SoftReset = 0x01,
    /// Leave sleep mode; wait 120 ms.
    SleepOut = 0x11,
    /// Normal display mode.
    NormalMode = 0x13,
    /// Colour inversion off.
    InversionOff = 0x20,
    /// Colour inversion on.
    InversionOn = 0x21,
    /// Display on.
    DisplayOn = 0x29,
    /// Column address window, 4 data bytes.
    ColumnAddressSet = 0x2A,
    /// Row address window, 4 data bytes.
    RowAddressSet = 0x2B,
    /// Start pixel data.
    MemoryWrite = 0x2C,
    /// Memory access control (scan direction, RGB/BGR), 1 data byte.
    MemoryAccessControl = 0x36,
    /// Interface pixel format, 1 data byte.
    PixelFormat = 0x3A,
}

/// MADCTL row address order.
pub const MADCTL_MY: u8 = 0x80;
/// MADCTL column address order.
pub const MADCTL_MX: u8 = 0x40;
/// MADCTL row/column exchange.
pub const MADCTL_MV: u8 = 0x20;
/// MADCTL BGR subpixel order (HAT panels are BGR).
pub const MADCTL_BGR: u8 = 0x08;

/// COLMOD value for 16 bits per pixel.
pub const COLMOD_16BPP: u8 = 0x05;

/// Largest single SPI write for pixel data. spidev's default buffer is 4 KiB.
pub const PIXEL_CHUNK: usize = 4096;

/// MADCTL byte for a rotation.
pub fn madctl(rotation: Rotation) -> u8 {
    MADCTL_BGR
        | match rotation {
            Rotation::Degrees0 => 0,
            Rotation::Degrees90 => MADCTL_MX | MADCTL_MV,
            Rotation::Degrees180 => MADCTL_MX | MADCTL_MY,
            Rotation::Degrees270 => MADCTL_MY | MADCTL_MV,
        }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Geometry and optional features the driver is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Native width
    pub width: u32,
    /// Native height
    pub height: u32,
    /// Scan rotation
    pub rotation: Rotation,
    /// Window offset into controller RAM
    pub offset: (u16, u16),
    /// Colour inversion
    pub inverted: bool,
    /// Backlight is on when its pin is high
    pub backlight_active_high: bool,
}

impl Options {
    /// Options with every optional feature at its default.
    pub fn from_minimal(params: &MinimalParams) -> Self {
        Self {
            width: params.width,
            height: params.height,
            rotation: params.rotation,
            offset: (0, 0),
            inverted: false,
            backlight_active_high: true,
        }
    }
}

/// ST7735 panel.
///
/// Generic over:
/// - `SPI`: an [`embedded_hal::spi::SpiDevice`] (manages CS).
/// - `DC`, `BL`, `RST`: [`embedded_hal::digital::OutputPin`]s; backlight and
///   reset are optional because some HATs tie them off.
/// - `DELAY`: [`embedded_hal::delay::DelayNs`] for reset timing.
pub struct St7735<SPI, DC, BL, RST, DELAY> {
    spi: SPI,
    dc: DC,
    bl: Option<BL>,
    rst: Option<RST>,
    delay: DELAY,
    options: Options,
}

impl<SPI, DC, BL, RST, DELAY> St7735<SPI, DC, BL, RST, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    BL: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Wrap the bus and pins. Call [`init`](Self::init) before drawing.
    pub fn new(spi: SPI, dc: DC, bl: Option<BL>, rst: Option<RST>, delay: DELAY, options: Options) -> Self {
        Self {
            spi,
            dc,
            bl,
            rst,
            delay,
            options,
        }
    }

    /// Current options.
    pub fn options(&self) -> Options {
        self.options
    }

    // -----------------------------------------------------------------------
    // Low-level SPI helpers
    // -----------------------------------------------------------------------

    fn send_command(&mut self, cmd: Command) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Gpio("DC"))?;
        self.spi
            .write(&[cmd as u8])
            .map_err(|_| PanelError::Communication)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), PanelError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| PanelError::Gpio("DC"))?;
        self.spi.write(data).map_err(|_| PanelError::Communication)
    }

    fn cmd_data(&mut self, cmd: Command, data: &[u8]) -> Result<(), PanelError> {
        self.send_command(cmd)?;
        self.send_data(data)
    }

    // -----------------------------------------------------------------------
    // Bring-up
    // -----------------------------------------------------------------------

    /// RST HIGH 10 ms → LOW 50 ms → HIGH 50 ms. No-op without a reset line.
    fn hardware_reset(&mut self) -> Result<(), PanelError> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        rst.set_high().map_err(|_| PanelError::Gpio("RST"))?;
        self.delay.delay_ms(10);
        rst.set_low().map_err(|_| PanelError::Gpio("RST"))?;
        self.delay.delay_ms(50);
        rst.set_high().map_err(|_| PanelError::Gpio("RST"))?;
        self.delay.delay_ms(50);
        Ok(())
    }

    /// Reset the controller and bring it to normal display mode.
    pub fn init(&mut self) -> Result<(), PanelError> {
        self.hardware_reset()?;
        self.send_command(Command::SoftReset)?;
        self.delay.delay_ms(150);
        self.send_command(Command::SleepOut)?;
        self.delay.delay_ms(120);
        self.cmd_data(Command::PixelFormat, &[COLMOD_16BPP])?;
        self.cmd_data(Command::MemoryAccessControl, &[madctl(self.options.rotation)])?;
        self.send_inversion()?;
        self.send_command(Command::NormalMode)?;
        self.delay.delay_ms(10);
        self.send_command(Command::DisplayOn)?;
        self.delay.delay_ms(100);
        Ok(())
    }

    fn send_inversion(&mut self) -> Result<(), PanelError> {
        self.send_command(if self.options.inverted {
            Command::InversionOn
        } else {
            Command::InversionOff
        })
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    /// RAM offset in the rotated column/row address space.
    fn window_offset(&self) -> (u16, u16) {
        let (ox, oy) = self.options.offset;
        if self.options.rotation.swaps_dimensions() {
            (oy, ox)
        } else {
            (ox, oy)
        }
    }

    /// Column/row window for a `width`×`height` area at the origin, shifted
    /// by the RAM offset.
    ///
    /// The offset is given in native panel axes. MADCTL's row/column
    /// exchange moves columns onto the native rows, so the two adjusts swap
    /// with it.
    fn set_window(&mut self, width: u32, height: u32) -> Result<(), PanelError> {
        let (ox, oy) = self.window_offset();
        let span = |start: u16, len: u32| -> Result<[u8; 4], PanelError> {
            let len = u16::try_from(len).map_err(|_| PanelError::RejectedParameter("window size"))?;
            let end = start
                .checked_add(len.saturating_sub(1))
                .ok_or(PanelError::RejectedParameter("offset"))?;
            let [s_hi, s_lo] = start.to_be_bytes();
            let [e_hi, e_lo] = end.to_be_bytes();
            Ok([s_hi, s_lo, e_hi, e_lo])
        };
        let columns = span(ox, width)?;
        let rows = span(oy, height)?;
        self.cmd_data(Command::ColumnAddressSet, &columns)?;
        self.cmd_data(Command::RowAddressSet, &rows)
    }

    fn write_pixels(&mut self, frame: &Frame) -> Result<(), PanelError> {
        self.send_command(Command::MemoryWrite)?;
        let mut chunk = Vec::with_capacity(PIXEL_CHUNK);
        for &pixel in frame.pixels() {
            chunk.extend_from_slice(&Rgb565::from(pixel).into_storage().to_be_bytes());
            if chunk.len() >= PIXEL_CHUNK {
                self.send_data(&chunk)?;
                chunk.clear();
            }
        }
        self.send_data(&chunk)
    }
}

impl<SPI, DC, BL, RST, DELAY> Panel for St7735<SPI, DC, BL, RST, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    BL: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn size(&self) -> Size {
        self.options
            .rotation
            .visible_size(self.options.width, self.options.height)
    }

    fn draw_frame(&mut self, frame: &Frame) -> Result<(), PanelError> {
        let size = self.size();
        if frame.size() != size {
            return Err(PanelError::FrameSize {
                width: size.width,
                height: size.height,
                actual_width: frame.size().width,
                actual_height: frame.size().height,
            });
        }
        self.set_window(size.width, size.height)?;
        self.write_pixels(frame)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), PanelError> {
        let active_high = self.options.backlight_active_high;
        let Some(bl) = self.bl.as_mut() else {
            return Ok(());
        };
        if on == active_high {
            bl.set_high()
        } else {
            bl.set_low()
        }
        .map_err(|_| PanelError::Gpio("BL"))
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), PanelError> {
        self.options.inverted = inverted;
        self.send_inversion()
    }

    fn set_backlight_polarity(&mut self, active_high: bool) -> Result<(), PanelError> {
        self.options.backlight_active_high = active_high;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    type TestDriver = St7735<SpiMock<u8>, PinMock, PinMock, PinMock, NoopDelay>;

    /// TransactionStart + Write(data) + TransactionEnd, as produced by one
    /// `SpiDevice::write` call.
    fn spi_device_write(data: &[u8]) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(data.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    /// Expectations for a command followed by optional data.
    fn command(cmd: Command, data: &[u8], spi: &mut Vec<SpiTransaction<u8>>, dc: &mut Vec<PinTransaction>) {
        spi.extend(spi_device_write(&[cmd as u8]));
        dc.push(PinTransaction::set(PinState::Low));
        if !data.is_empty() {
            spi.extend(spi_device_write(data));
            dc.push(PinTransaction::set(PinState::High));
        }
    }

    fn options(width: u32, height: u32) -> Options {
        Options {
            width,
            height,
            rotation: Rotation::Degrees0,
            offset: (0, 0),
            inverted: false,
            backlight_active_high: true,
        }
    }

    #[test]
    fn madctl_per_rotation() {
        assert_eq!(madctl(Rotation::Degrees0), 0x08);
        assert_eq!(madctl(Rotation::Degrees90), 0x68);
        assert_eq!(madctl(Rotation::Degrees180), 0xC8);
        assert_eq!(madctl(Rotation::Degrees270), 0xA8);
    }

    #[test]
    fn init_sequence() {
        let mut spi_txns = Vec::new();
        let mut dc_txns = Vec::new();
        command(Command::SoftReset, &[], &mut spi_txns, &mut dc_txns);
        command(Command::SleepOut, &[], &mut spi_txns, &mut dc_txns);
        command(Command::PixelFormat, &[COLMOD_16BPP], &mut spi_txns, &mut dc_txns);
        command(Command::MemoryAccessControl, &[0x68], &mut spi_txns, &mut dc_txns);
        command(Command::InversionOn, &[], &mut spi_txns, &mut dc_txns);
        command(Command::NormalMode, &[], &mut spi_txns, &mut dc_txns);
        command(Command::DisplayOn, &[], &mut spi_txns, &mut dc_txns);

        let mut spi = SpiMock::new(&spi_txns);
        let mut dc = PinMock::new(&dc_txns);
        let mut rst = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let mut drv: TestDriver = St7735::new(
            spi.clone(),
            dc.clone(),
            None,
            Some(rst.clone()),
            NoopDelay,
            Options {
                rotation: Rotation::Degrees90,
                inverted: true,
                ..options(128, 128)
            },
        );
        drv.init().unwrap();

        spi.done();
        dc.done();
        rst.done();
    }

    #[test]
    fn frame_is_windowed_with_offset_and_sent_as_rgb565() {
        let mut spi_txns = Vec::new();
        let mut dc_txns = Vec::new();
        // 2x2 at offset (2, 3): columns 2..=3, rows 3..=4.
        command(Command::ColumnAddressSet, &[0, 2, 0, 3], &mut spi_txns, &mut dc_txns);
        command(Command::RowAddressSet, &[0, 3, 0, 4], &mut spi_txns, &mut dc_txns);
        command(
            Command::MemoryWrite,
            &[0xF8, 0x00, 0xF8, 0x00, 0xF8, 0x00, 0xFF, 0xFF],
            &mut spi_txns,
            &mut dc_txns,
        );

        let mut spi = SpiMock::new(&spi_txns);
        let mut dc = PinMock::new(&dc_txns);

        let mut drv: TestDriver = St7735::new(
            spi.clone(),
            dc.clone(),
            None,
            None,
            NoopDelay,
            Options {
                offset: (2, 3),
                ..options(2, 2)
            },
        );
        let mut frame = Frame::filled(Size::new(2, 2), Rgb888::RED);
        Pixel(Point::new(1, 1), Rgb888::WHITE).draw(&mut frame).unwrap();
        drv.draw_frame(&frame).unwrap();

        spi.done();
        dc.done();
    }

    #[test]
    fn row_column_exchange_swaps_the_offset() {
        // 4x2 native at 90°: 2x4 visible. Columns now run along the native
        // rows, so they take the Y adjust: columns 3..=4, rows 2..=5.
        let mut spi_txns = Vec::new();
        let mut dc_txns = Vec::new();
        command(Command::ColumnAddressSet, &[0, 3, 0, 4], &mut spi_txns, &mut dc_txns);
        command(Command::RowAddressSet, &[0, 2, 0, 5], &mut spi_txns, &mut dc_txns);
        command(Command::MemoryWrite, &[0; 16], &mut spi_txns, &mut dc_txns);

        let mut spi = SpiMock::new(&spi_txns);
        let mut dc = PinMock::new(&dc_txns);

        let mut drv: TestDriver = St7735::new(
            spi.clone(),
            dc.clone(),
            None,
            None,
            NoopDelay,
            Options {
                rotation: Rotation::Degrees90,
                offset: (2, 3),
                ..options(4, 2)
            },
        );
        assert_eq!(drv.size(), Size::new(2, 4));
        drv.draw_frame(&Frame::new(Size::new(2, 4))).unwrap();

        spi.done();
        dc.done();
    }

    #[test]
    fn upside_down_keeps_native_offset_axes() {
        let mut spi_txns = Vec::new();
        let mut dc_txns = Vec::new();
        command(Command::ColumnAddressSet, &[0, 2, 0, 5], &mut spi_txns, &mut dc_txns);
        command(Command::RowAddressSet, &[0, 3, 0, 4], &mut spi_txns, &mut dc_txns);
        command(Command::MemoryWrite, &[0; 16], &mut spi_txns, &mut dc_txns);

        let mut spi = SpiMock::new(&spi_txns);
        let mut dc = PinMock::new(&dc_txns);

        let mut drv: TestDriver = St7735::new(
            spi.clone(),
            dc.clone(),
            None,
            None,
            NoopDelay,
            Options {
                rotation: Rotation::Degrees180,
                offset: (2, 3),
                ..options(4, 2)
            },
        );
        drv.draw_frame(&Frame::new(Size::new(4, 2))).unwrap();

        spi.done();
        dc.done();
    }

    #[test]
    fn wrong_frame_size_touches_nothing() {
        let mut spi = SpiMock::new(&[]);
        let mut dc = PinMock::new(&[]);
        let mut drv: TestDriver = St7735::new(spi.clone(), dc.clone(), None, None, NoopDelay, options(4, 2));

        let err = drv.draw_frame(&Frame::new(Size::new(2, 4))).unwrap_err();
        assert!(matches!(err, PanelError::FrameSize { width: 4, height: 2, .. }));

        spi.done();
        dc.done();
    }

    #[test]
    fn backlight_honours_polarity() {
        let mut spi = SpiMock::new(&[]);
        let mut dc = PinMock::new(&[]);
        let mut bl = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let mut drv: TestDriver =
            St7735::new(spi.clone(), dc.clone(), Some(bl.clone()), None, NoopDelay, options(4, 4));

        drv.set_backlight(true).unwrap();
        drv.set_backlight(false).unwrap();
        drv.set_backlight_polarity(false).unwrap();
        drv.set_backlight(true).unwrap();

        spi.done();
        dc.done();
        bl.done();
    }

    #[test]
    fn runtime_inversion_sends_command() {
        let mut spi_txns = Vec::new();
        let mut dc_txns = Vec::new();
        command(Command::InversionOn, &[], &mut spi_txns, &mut dc_txns);
        let mut spi = SpiMock::new(&spi_txns);
        let mut dc = PinMock::new(&dc_txns);

        let mut drv: TestDriver = St7735::new(spi.clone(), dc.clone(), None, None, NoopDelay, options(4, 4));
        drv.set_inverted(true).unwrap();
        assert!(drv.options().inverted);

        spi.done();
        dc.done();
    }
}
