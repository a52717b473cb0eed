//! Hardware Abstraction Layer (HAL) for the LCD HAT
//!
//! This crate provides trait-based abstractions for the display panel and
//! the button/joystick inputs, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (lcd-hat crate: adapter, input manager, CLI)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (rppal GPIO, spidev, ST7735 driver)
//! ```
//!
//! # Abstraction Levels
//!
//! - [`PanelBackend`] / [`Panel`] - two-tier panel construction and frame pushes
//! - [`GpioBackend`] / [`InterruptPin`] - input pins with optional edge callbacks
//! - [`InputDevice`] - consumer side of debounced button events
//!
//! # Features
//!
//! - `mocks`: Host-side [`mocks::MockGpio`] and [`mocks::MockPanelBackend`]
//! - `serde`: Serialize/Deserialize derives on config-facing types
//!
//! # Example
//!
//! ```no_run
//! use platform::{Frame, Panel};
//!
//! fn blank<P: Panel>(panel: &mut P) -> Result<(), platform::PanelError> {
//!     panel.draw_frame(&Frame::new(panel.size()))
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
// Pedantic lints suppressed for this HAL crate:
#![allow(clippy::doc_markdown)] // pin and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod display;
pub mod gpio;
pub mod input;
pub mod mocks;

// Re-export main high-level traits
pub use display::{
    CapabilityProbeError, DriverIdentity, ExtendedParams, Frame, MinimalParams, Panel,
    PanelBackend, PanelError, PanelFeature, Rotation,
};
pub use input::{Button, InputDevice, InputEvent, Transition};

// Re-export GPIO types
pub use gpio::{EdgeCallback, GpioBackend, InputPin, InterruptMode, InterruptPin, PinState, Pull};
