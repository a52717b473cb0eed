//! Display abstraction layer
//!
//! A [`PanelBackend`] knows how to build a [`Panel`] in two ways: with the
//! extended parameter set (window offsets, inversion, backlight polarity) or
//! with the minimal set every driver accepts. Which optional features a
//! backend honours is looked up from its [`DriverIdentity`], never discovered
//! by trial.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Panel rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// No rotation (native orientation)
    #[default]
    Degrees0,
    /// Rotate 90° clockwise
    Degrees90,
    /// Rotate 180°
    Degrees180,
    /// Rotate 270° clockwise / 90° counter-clockwise
    Degrees270,
}

impl Rotation {
    /// Parse a rotation given in degrees. Only right angles are accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Degrees0),
            90 => Some(Self::Degrees90),
            180 => Some(Self::Degrees180),
            270 => Some(Self::Degrees270),
            _ => None,
        }
    }

    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Degrees0 => 0,
            Self::Degrees90 => 90,
            Self::Degrees180 => 180,
            Self::Degrees270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Degrees90 | Self::Degrees270)
    }

    /// Calculate visible dimensions after rotation
    pub fn apply_to_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Visible window size for a panel of `width` × `height` pixels.
    pub fn visible_size(self, width: u32, height: u32) -> Size {
        let (w, h) = self.apply_to_dimensions(width, height);
        Size::new(w, h)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Whole-screen RGB pixel buffer.
///
/// Rendering code draws into a `Frame` with any `embedded-graphics`
/// primitive; the display adapter then pushes it in one go. Pixels outside
/// the frame are clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl Frame {
    /// All-black frame of the given size.
    pub fn new(size: Size) -> Self {
        Self::filled(size, Rgb888::BLACK)
    }

    /// Frame of the given size filled with `color`.
    pub fn filled(size: Size, color: Rgb888) -> Self {
        let len = (size.width as usize).saturating_mul(size.height as usize);
        Self {
            size,
            pixels: vec![color; len],
        }
    }

    /// Frame size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    /// Pixel at `point`, or `None` outside the frame.
    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).and_then(|i| self.pixels.get(i).copied())
    }

    /// `true` when every pixel has the given color.
    pub fn is_filled_with(&self, color: Rgb888) -> bool {
        self.pixels.iter().all(|&p| p == color)
    }

    fn index(&self, point: Point) -> Option<usize> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        let width = self.size.width as usize;
        if x >= width || y >= self.size.height as usize {
            return None;
        }
        y.checked_mul(width)?.checked_add(x)
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(slot) = self.index(point).and_then(|i| self.pixels.get_mut(i)) {
                *slot = color;
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        self.size
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Optional panel features that not every driver supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelFeature {
    /// Visible window offset inside controller RAM
    OffsetWindow,
    /// Colour inversion
    Invert,
    /// Active-low backlight handling
    BacklightPolarity,
}

impl core::fmt::Display for PanelFeature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OffsetWindow => f.write_str("offset window"),
            Self::Invert => f.write_str("colour inversion"),
            Self::BacklightPolarity => f.write_str("backlight polarity"),
        }
    }
}

/// Errors raised while building or driving a panel.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The driver has no way to apply this feature.
    #[error("{0} is not supported by this driver")]
    Unsupported(PanelFeature),
    /// The driver's constructor refused a parameter.
    #[error("driver rejected parameter `{0}`")]
    RejectedParameter(&'static str),
    /// SPI transfer failed.
    #[error("SPI communication error")]
    Communication,
    /// A control line (DC, RST, BL) could not be driven.
    #[error("GPIO error on {0} line")]
    Gpio(&'static str),
    /// Frame does not match the panel's visible window.
    #[error("frame is {actual_width}x{actual_height}, panel window is {width}x{height}")]
    FrameSize {
        /// Window width
        width: u32,
        /// Window height
        height: u32,
        /// Frame width
        actual_width: u32,
        /// Frame height
        actual_height: u32,
    },
    /// Opening a device node or claiming a line failed.
    #[error("{context}")]
    Device {
        /// What was being opened
        context: String,
        /// Underlying OS / library error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PanelError {
    /// Wrap an OS-level error with a short description of what failed.
    pub fn device<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Device {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Why a backend could not report its identity.
#[derive(Debug, Error)]
pub enum CapabilityProbeError {
    /// The backend cannot name its driver.
    #[error("driver identity unavailable: {0}")]
    Unavailable(String),
    /// The reported version string could not be parsed.
    #[error("malformed driver version `{0}`")]
    MalformedVersion(String),
}

// ---------------------------------------------------------------------------
// Construction parameters
// ---------------------------------------------------------------------------

/// Name and version of the driver a backend wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverIdentity {
    /// Driver name, e.g. `st7735`
    pub name: String,
    /// Dotted version, e.g. `0.1.0`
    pub version: String,
}

impl DriverIdentity {
    /// Build an identity from name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl core::fmt::Display for DriverIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Parameters every driver accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalParams {
    /// SPI bus number (`/dev/spidev<port>.<cs>`)
    pub port: u8,
    /// Chip-select index
    pub cs: u8,
    /// Data/command GPIO
    pub dc: u8,
    /// Backlight GPIO, if wired
    pub backlight: Option<u8>,
    /// Reset GPIO, if wired
    pub reset: Option<u8>,
    /// Panel rotation
    pub rotation: Rotation,
    /// SPI clock in Hz
    pub speed_hz: u32,
    /// Native panel width
    pub width: u32,
    /// Native panel height
    pub height: u32,
}

impl MinimalParams {
    /// Visible window after rotation.
    pub fn visible_size(&self) -> Size {
        self.rotation.visible_size(self.width, self.height)
    }
}

/// Minimal parameters plus whichever optional features the driver accepts.
///
/// A `None` field means the feature is not passed to the constructor at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedParams {
    /// Universally supported parameters
    pub base: MinimalParams,
    /// Window offset `(x, y)` in pixels
    pub offset: Option<(u16, u16)>,
    /// Colour inversion
    pub invert: Option<bool>,
    /// `true` if the backlight is on when its pin is high
    pub backlight_active_high: Option<bool>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An initialised panel.
///
/// All calls are blocking. Optional features default to
/// [`PanelError::Unsupported`] so drivers only override what they support.
pub trait Panel {
    /// Visible window size.
    fn size(&self) -> Size;

    /// Push a whole frame.
    fn draw_frame(&mut self, frame: &Frame) -> Result<(), PanelError>;

    /// Drive the backlight. `on` follows the panel's current polarity.
    fn set_backlight(&mut self, on: bool) -> Result<(), PanelError>;

    /// Enable or disable colour inversion after construction.
    fn set_inverted(&mut self, _inverted: bool) -> Result<(), PanelError> {
        Err(PanelError::Unsupported(PanelFeature::Invert))
    }

    /// Tell the panel which backlight level means "on".
    fn set_backlight_polarity(&mut self, _active_high: bool) -> Result<(), PanelError> {
        Err(PanelError::Unsupported(PanelFeature::BacklightPolarity))
    }
}

/// Factory for panels of one driver family.
pub trait PanelBackend {
    /// Panel type produced by this backend.
    type Panel: Panel;

    /// Name and version of the wrapped driver.
    fn identity(&self) -> Result<DriverIdentity, CapabilityProbeError>;

    /// Build and initialise a panel with the extended parameter set.
    fn construct_extended(&mut self, params: &ExtendedParams) -> Result<Self::Panel, PanelError>;

    /// Build and initialise a panel with only the minimal parameter set.
    fn construct_minimal(&mut self, params: &MinimalParams) -> Result<Self::Panel, PanelError>;
}
