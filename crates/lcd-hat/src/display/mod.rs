//! Display side: capability probe, tiered adapter and the ST7735 driver.
//!
//! ```text
//! probe(backend) ──► DriverCapabilities ──► init(backend, config, caps) ──► PanelHandle
//! ```
//!
//! [`ping::run`] drives a [`PanelHandle`] through the link-check frames.

pub mod adapter;
pub mod ping;
pub mod probe;
pub mod st7735;

pub use adapter::{init, PanelHandle, Tier};
pub use panel_specs::DriverCapabilities;
pub use probe::probe;
pub use st7735::St7735;
