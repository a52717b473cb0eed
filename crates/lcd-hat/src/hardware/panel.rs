//! spidev panel backend.

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{Delay, SpidevDevice};
use platform::{
    CapabilityProbeError, DriverIdentity, ExtendedParams, MinimalParams, PanelBackend, PanelError,
};
use rppal::gpio::{Gpio, OutputPin};
use tracing::debug;

use crate::display::st7735::{Options, St7735};

/// Native driver on Linux peripherals.
pub type LinuxSt7735 = St7735<SpidevDevice, OutputPin, OutputPin, OutputPin, Delay>;

/// Builds [`LinuxSt7735`] panels from `/dev/spidev{port}.{cs}` and rppal
/// output pins. Every construction opens its own bus and lines.
pub struct LinuxPanelBackend {
    gpio: Gpio,
}

impl LinuxPanelBackend {
    /// Open the GPIO controller used for DC, BL and RST.
    pub fn open() -> Result<Self, PanelError> {
        let gpio = Gpio::new().map_err(|e| PanelError::device("open GPIO controller", e))?;
        Ok(Self { gpio })
    }

    fn output(&self, pin: u8) -> Result<OutputPin, PanelError> {
        self.gpio
            .get(pin)
            .map(|p| p.into_output_low())
            .map_err(|e| PanelError::device(format!("claim GPIO{pin}"), e))
    }

    fn build(&mut self, base: &MinimalParams, options: Options) -> Result<LinuxSt7735, PanelError> {
        let path = format!("/dev/spidev{}.{}", base.port, base.cs);
        let mut spi =
            SpidevDevice::open(&path).map_err(|e| PanelError::device(format!("open {path}"), e))?;
        let spi_options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(base.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&spi_options)
            .map_err(|e| PanelError::device(format!("configure {path}"), e))?;

        let dc = self.output(base.dc)?;
        let bl = base.backlight.map(|pin| self.output(pin)).transpose()?;
        let rst = base.reset.map(|pin| self.output(pin)).transpose()?;

        debug!(
            %path,
            speed_hz = base.speed_hz,
            dc = base.dc,
            rotation = base.rotation.degrees(),
            "initialising ST7735"
        );
        let mut panel = St7735::new(spi, dc, bl, rst, Delay, options);
        panel.init()?;
        Ok(panel)
    }
}

impl PanelBackend for LinuxPanelBackend {
    type Panel = LinuxSt7735;

    fn identity(&self) -> Result<DriverIdentity, CapabilityProbeError> {
        Ok(DriverIdentity::new("st7735", env!("CARGO_PKG_VERSION")))
    }

    fn construct_extended(&mut self, params: &ExtendedParams) -> Result<Self::Panel, PanelError> {
        let defaults = Options::from_minimal(&params.base);
        let options = Options {
            offset: params.offset.unwrap_or(defaults.offset),
            inverted: params.invert.unwrap_or(defaults.inverted),
            backlight_active_high: params
                .backlight_active_high
                .unwrap_or(defaults.backlight_active_high),
            ..defaults
        };
        self.build(&params.base, options)
    }

    fn construct_minimal(&mut self, params: &MinimalParams) -> Result<Self::Panel, PanelError> {
        self.build(params, Options::from_minimal(params))
    }
}
