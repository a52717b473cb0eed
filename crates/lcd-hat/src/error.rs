//! Error types
//!
//! Only [`HardwareInitError`] (display) and [`InputError`] (session start-up)
//! reach callers. The rest describe conditions that are absorbed into a
//! degraded state and only ever show up in logs.

use platform::{Button, PanelError};
use thiserror::Error;

/// Minimal panel construction failed. Fatal: there is no lower tier.
#[derive(Debug, Error)]
#[error("display initialisation failed ({tier} constructor)")]
pub struct HardwareInitError {
    tier: &'static str,
    #[source]
    source: PanelError,
}

impl HardwareInitError {
    pub(crate) fn minimal(source: PanelError) -> Self {
        Self {
            tier: "minimal",
            source,
        }
    }

    /// The underlying panel error.
    pub fn cause(&self) -> &PanelError {
        &self.source
    }
}

/// Extended construction failed; recovered by the minimal tier.
#[derive(Debug, Error)]
#[error("extended constructor rejected, falling back to minimal parameters")]
pub struct ExtendedInitError(#[source] pub PanelError);

/// Errors on an initialised panel.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Frame does not match the visible window.
    #[error("frame is {actual_width}x{actual_height}, visible window is {width}x{height}")]
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
    /// The panel reported an error.
    #[error(transparent)]
    Panel(#[from] PanelError),
}

/// Edge detection could not be registered; recovered by polling.
#[derive(Debug, Error)]
#[error("edge detection unavailable on {button} (GPIO{pin})")]
pub struct EdgeRegistrationError {
    /// Affected button
    pub button: Button,
    /// Its GPIO
    pub pin: u8,
    /// Platform error
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// A poll-mode read failed; retried on the next tick.
#[derive(Debug, Error)]
#[error("reading {button} (GPIO{pin}) failed")]
pub struct PinReadError {
    /// Affected button
    pub button: Button,
    /// Its GPIO
    pub pin: u8,
    /// Platform error
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Input session start-up failures.
#[derive(Debug, Error)]
pub enum InputError {
    /// The same logical button was configured twice.
    #[error("{0} is configured more than once")]
    DuplicateButton(Button),
    /// The GPIO controller could not be opened.
    #[error("GPIO controller unavailable")]
    Controller(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A button's pin could not be claimed.
    #[error("cannot claim GPIO{pin} for {button}")]
    Claim {
        /// Affected button
        button: Button,
        /// Its GPIO
        pin: u8,
        /// Platform error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
