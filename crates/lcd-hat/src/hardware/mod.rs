//! Raspberry Pi backends (feature `hardware`).
//!
//! - [`RppalGpio`]: button inputs through `rppal`, with async edge
//!   interrupts where the kernel grants them
//! - [`LinuxPanelBackend`]: spidev + rppal output pins driving the native
//!   [`St7735`](crate::display::St7735) driver

pub mod gpio;
pub mod panel;

pub use gpio::{RppalGpio, RppalInputPin};
pub use panel::{LinuxPanelBackend, LinuxSt7735};
