//! LCD Panel Specifications
//!
//! Static data about SPI LCD drivers and the boards they ship on.
//!
//! # Features
//!
//! - **Capability table** - which optional constructor features each driver
//!   revision honours ([`capabilities_for`])
//! - **Board presets** - partial configurations for known HATs
//!   ([`find_preset`])
//! - **Serde support** - optional serialization for config dumps
//!
//! # Example
//!
//! ```
//! use panel_specs::{capabilities_for, find_preset, DriverVersion};
//!
//! let caps = capabilities_for("st7735", DriverVersion::new(0, 1, 0)).unwrap_or_default();
//! assert!(caps.offset_window);
//!
//! let preset = find_preset("waveshare-1.44").unwrap();
//! assert_eq!(preset.get("LCD_DC"), Some("25"));
//! ```

pub mod boards;
pub mod capabilities;

pub use boards::{find_preset, BoardPreset, PRESETS};
pub use capabilities::{
    capabilities_for, DriverCapabilities, DriverRevision, DriverVersion, DRIVER_TABLE,
};
