//! LCD HAT runtime
//!
//! Display bring-up and debounced button input for ST7735 LCD HATs on a
//! Raspberry Pi.
//!
//! # Architecture
//!
//! ```text
//! lcd.env / env / --set ──► config::Resolver ──► Config
//!                                                  │
//!          ┌───────────────────────────────────────┴──────────────┐
//!          ▼                                                      ▼
//! display::probe ─► display::init ─► PanelHandle        input::InputSession
//!     (capability table)  (extended → minimal tier)       (edge, or poll fallback)
//!                              │                                 │
//!                     render::centered_text              EventSink / InputEvents
//! ```
//!
//! Both sides are written against the `platform` traits, so everything but
//! the `hardware` module runs against `platform::mocks` on a host.
//!
//! # Features
//!
//! - `hardware`: rppal GPIO and spidev backends plus the `lcd-hat` binary
//!
//! # Example
//!
//! ```no_run
//! use lcd_hat::config::{Config, Resolver};
//! use lcd_hat::display;
//! use lcd_hat::render::{centered_text, TextTheme};
//!
//! # fn run<B: platform::PanelBackend>(backend: &mut B) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_settings(&Resolver::new().resolve()?)?;
//! let caps = display::probe(backend);
//! let mut panel = display::init(backend, &config.display, caps)?;
//! panel.draw_frame(&centered_text(panel.window(), "Hej Pi!", TextTheme::Hello))?;
//! # Ok(())
//! # }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod display;
pub mod error;
#[cfg(feature = "hardware")]
pub mod hardware;
pub mod input;
pub mod render;

pub use config::{Config, DisplayConfig, InputConfig, Resolver};
pub use display::{init, probe, PanelHandle, Tier};
pub use error::{DisplayError, HardwareInitError, InputError};
pub use input::{ButtonSpec, InputEvents, InputSession, Polarity, WatchState};
