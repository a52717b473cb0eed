//! Configuration
//!
//! Settings arrive as flat `KEY=VALUE` layers (built-in defaults, a board
//! preset, the `lcd.env` file, environment and command-line overrides). The
//! [`Resolver`] merges them; [`Config::from_settings`] turns the result into
//! typed, immutable values shared by the display adapter and input manager.
//!
//! | Key               | Meaning                                   | Default   |
//! |-------------------|-------------------------------------------|-----------|
//! | `LCD_PRESET`      | board preset name                         | (none)    |
//! | `LCD_PORT`        | SPI bus                                   | 0         |
//! | `LCD_CS`          | SPI chip-select                           | 0         |
//! | `LCD_DC`          | data/command GPIO                         | 9         |
//! | `LCD_BL`          | backlight GPIO, `-1` = not wired          | 19        |
//! | `LCD_RST`         | reset GPIO, `-1` = not wired              | -1        |
//! | `LCD_ROT`         | rotation in degrees                       | 90        |
//! | `LCD_SPEED`       | SPI clock in Hz                           | 4000000   |
//! | `LCD_WIDTH`       | panel width                               | 128       |
//! | `LCD_HEIGHT`      | panel height                              | 128       |
//! | `LCD_OX`/`LCD_OY` | window offset                             | 0         |
//! | `LCD_INVERT`      | colour inversion                          | 0         |
//! | `LCD_BL_ACTIVE`   | 1 = backlight active-high                 | 1         |
//! | `BTN_*`           | button GPIOs, `-1` = disabled             | HAT pins  |
//! | `BTN_ACTIVE_LOW`  | 1 = buttons pull to ground when pressed   | 1         |
//! | `BTN_DEBOUNCE_MS` | debounce window                           | 50        |
//! | `BTN_POLL_MS`     | poll tick when edges are unavailable      | max(20, debounce) |
//! | `LCD_CYCLES`      | colour cycles shown by `lcd-hat ping`     | 2         |
//! | `LCD_DELAY_MS`    | pause after each `ping` frame             | 500       |

pub mod env_file;
mod resolver;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use embedded_graphics::prelude::Size;
use platform::{Button, MinimalParams, Rotation};
use serde::Serialize;
use thiserror::Error;

use crate::input::{ButtonSpec, Polarity};

pub use resolver::{env_overrides, Resolver, DEFAULTS};

/// Flat key/value settings, as merged by the [`Resolver`].
pub type Settings = BTreeMap<String, String>;

/// Every key this crate understands.
pub mod keys {
    #![allow(missing_docs)]

    pub const LCD_PRESET: &str = "LCD_PRESET";
    pub const LCD_PORT: &str = "LCD_PORT";
    pub const LCD_CS: &str = "LCD_CS";
    pub const LCD_DC: &str = "LCD_DC";
    pub const LCD_BL: &str = "LCD_BL";
    pub const LCD_RST: &str = "LCD_RST";
    pub const LCD_ROT: &str = "LCD_ROT";
    pub const LCD_SPEED: &str = "LCD_SPEED";
    pub const LCD_WIDTH: &str = "LCD_WIDTH";
    pub const LCD_HEIGHT: &str = "LCD_HEIGHT";
    pub const LCD_OX: &str = "LCD_OX";
    pub const LCD_OY: &str = "LCD_OY";
    pub const LCD_INVERT: &str = "LCD_INVERT";
    pub const LCD_BL_ACTIVE: &str = "LCD_BL_ACTIVE";
    pub const BTN_ACTIVE_LOW: &str = "BTN_ACTIVE_LOW";
    pub const BTN_DEBOUNCE_MS: &str = "BTN_DEBOUNCE_MS";
    pub const BTN_POLL_MS: &str = "BTN_POLL_MS";
    pub const LCD_CYCLES: &str = "LCD_CYCLES";
    pub const LCD_DELAY_MS: &str = "LCD_DELAY_MS";

    /// All keys, button pins included.
    pub const ALL: &[&str] = &[
        LCD_PRESET,
        LCD_PORT,
        LCD_CS,
        LCD_DC,
        LCD_BL,
        LCD_RST,
        LCD_ROT,
        LCD_SPEED,
        LCD_WIDTH,
        LCD_HEIGHT,
        LCD_OX,
        LCD_OY,
        LCD_INVERT,
        LCD_BL_ACTIVE,
        "BTN_UP",
        "BTN_DOWN",
        "BTN_LEFT",
        "BTN_RIGHT",
        "BTN_CENTER",
        "BTN_A",
        "BTN_B",
        BTN_ACTIVE_LOW,
        BTN_DEBOUNCE_MS,
        BTN_POLL_MS,
        LCD_CYCLES,
        LCD_DELAY_MS,
    ];
}

/// Floor for the derived poll tick.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors while reading or interpreting settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("{key}: `{value}` is not a valid {expected}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        expected: &'static str,
    },
    /// `LCD_PRESET` names no known board.
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    /// A pin that must be wired was set to the disabled sentinel.
    #[error("{0} must name a GPIO; it cannot be disabled")]
    PinRequired(&'static str),
    /// The settings file could not be read.
    #[error("cannot read {}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

/// GPIO assignment that may be switched off with a negative number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinAssignment {
    /// BCM GPIO number
    Gpio(u8),
    /// Not wired / disabled (`-1` in settings)
    Disabled,
}

impl PinAssignment {
    /// Parse a pin value; any negative number is the disabled sentinel.
    pub fn parse(value: &str) -> Option<Self> {
        let n: i32 = value.trim().parse().ok()?;
        if n < 0 {
            return Some(Self::Disabled);
        }
        u8::try_from(n).ok().map(Self::Gpio)
    }

    /// GPIO number, if wired.
    pub fn gpio(self) -> Option<u8> {
        match self {
            Self::Gpio(n) => Some(n),
            Self::Disabled => None,
        }
    }
}

impl core::fmt::Display for PinAssignment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Gpio(n) => write!(f, "GPIO{n}"),
            Self::Disabled => f.write_str("-"),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Panel wiring and geometry
    pub display: DisplayConfig,
    /// Button wiring and timing
    pub input: InputConfig,
    /// Link check pacing
    pub ping: PingConfig,
}

/// Panel wiring and geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayConfig {
    /// Preset the values were layered on, if any
    pub preset: Option<String>,
    /// SPI bus
    pub port: u8,
    /// SPI chip-select
    pub cs: u8,
    /// Data/command GPIO
    pub dc: u8,
    /// Backlight GPIO
    pub backlight: PinAssignment,
    /// Reset GPIO
    pub reset: PinAssignment,
    /// Rotation
    pub rotation: Rotation,
    /// SPI clock in Hz
    pub speed_hz: u32,
    /// Native panel width
    pub width: u32,
    /// Native panel height
    pub height: u32,
    /// Window X offset
    pub offset_x: u16,
    /// Window Y offset
    pub offset_y: u16,
    /// Colour inversion
    pub invert: bool,
    /// Backlight is on when its pin is high
    pub backlight_active_high: bool,
}

impl DisplayConfig {
    /// Parameters every panel driver accepts.
    pub fn minimal_params(&self) -> MinimalParams {
        MinimalParams {
            port: self.port,
            cs: self.cs,
            dc: self.dc,
            backlight: self.backlight.gpio(),
            reset: self.reset.gpio(),
            rotation: self.rotation,
            speed_hz: self.speed_hz,
            width: self.width,
            height: self.height,
        }
    }

    /// Visible window after rotation; frames must match it exactly.
    pub fn visible_size(&self) -> Size {
        self.rotation.visible_size(self.width, self.height)
    }

    /// `true` if a non-zero window offset is configured.
    pub fn has_offset(&self) -> bool {
        self.offset_x != 0 || self.offset_y != 0
    }
}

/// Pacing of the `ping` frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PingConfig {
    /// Colour cycles after the border frame
    pub cycles: u32,
    /// Pause after each frame in milliseconds
    pub delay_ms: u64,
}

impl PingConfig {
    /// Pause after each frame.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Pin assignment for one logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonPin {
    /// Logical button
    pub button: Button,
    /// Its GPIO
    pub pin: PinAssignment,
}

/// Button wiring and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputConfig {
    /// One entry per logical button, in [`Button::ALL`] order
    pub pins: Vec<ButtonPin>,
    /// Buttons read low when pressed
    pub active_low: bool,
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
    /// Explicit poll tick in milliseconds
    pub poll_ms: Option<u64>,
}

impl InputConfig {
    /// Debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Poll tick for buttons without edge detection.
    ///
    /// Uses `BTN_POLL_MS` when set, otherwise the debounce window with a
    /// 20 ms floor.
    pub fn poll_interval(&self) -> Duration {
        self.poll_ms
            .map_or_else(|| self.debounce().max(MIN_POLL_INTERVAL), Duration::from_millis)
    }

    /// Polarity shared by every button.
    pub fn polarity(&self) -> Polarity {
        if self.active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }

    /// One [`ButtonSpec`] per configured button.
    pub fn button_specs(&self) -> Vec<ButtonSpec> {
        self.pins
            .iter()
            .map(|bp| ButtonSpec {
                button: bp.button,
                pin: bp.pin,
                polarity: self.polarity(),
                debounce: self.debounce(),
            })
            .collect()
    }
}

impl Config {
    /// Interpret merged settings. Missing keys fall back to [`DEFAULTS`].
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let s = Lookup(settings);

        let degrees: u16 = s.number(keys::LCD_ROT, "rotation in degrees")?;
        let rotation = Rotation::from_degrees(degrees).ok_or_else(|| ConfigError::Invalid {
            key: keys::LCD_ROT,
            value: s.raw(keys::LCD_ROT).to_owned(),
            expected: "rotation (0, 90, 180 or 270)",
        })?;

        let dc = s.pin(keys::LCD_DC)?.gpio().ok_or(ConfigError::PinRequired(keys::LCD_DC))?;

        let preset = Some(s.raw(keys::LCD_PRESET).trim())
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        let display = DisplayConfig {
            preset,
            port: s.number(keys::LCD_PORT, "SPI bus number")?,
            cs: s.number(keys::LCD_CS, "chip-select index")?,
            dc,
            backlight: s.pin(keys::LCD_BL)?,
            reset: s.pin(keys::LCD_RST)?,
            rotation,
            speed_hz: s.number(keys::LCD_SPEED, "SPI clock in Hz")?,
            width: s.dimension(keys::LCD_WIDTH)?,
            height: s.dimension(keys::LCD_HEIGHT)?,
            offset_x: s.number(keys::LCD_OX, "pixel offset")?,
            offset_y: s.number(keys::LCD_OY, "pixel offset")?,
            invert: s.flag(keys::LCD_INVERT),
            backlight_active_high: s.flag(keys::LCD_BL_ACTIVE),
        };

        let pins = Button::ALL
            .into_iter()
            .map(|button| {
                Ok(ButtonPin {
                    button,
                    pin: s.pin(button.key())?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let poll_ms = match s.raw(keys::BTN_POLL_MS).trim() {
            "" => None,
            _ => match s.number::<u64>(keys::BTN_POLL_MS, "positive poll interval in ms")? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: keys::BTN_POLL_MS,
                        value: s.raw(keys::BTN_POLL_MS).to_owned(),
                        expected: "positive poll interval in ms",
                    })
                }
                ms => Some(ms),
            },
        };

        let input = InputConfig {
            pins,
            active_low: s.flag(keys::BTN_ACTIVE_LOW),
            debounce_ms: s.number(keys::BTN_DEBOUNCE_MS, "debounce in ms")?,
            poll_ms,
        };

        let ping = PingConfig {
            cycles: s.number(keys::LCD_CYCLES, "cycle count")?,
            delay_ms: s.number(keys::LCD_DELAY_MS, "delay in ms")?,
        };

        Ok(Self {
            display,
            input,
            ping,
        })
    }
}

/// Read access to merged settings with default fallback.
struct Lookup<'a>(&'a Settings);

impl<'a> Lookup<'a> {
    fn raw(&self, key: &str) -> &'a str {
        self.0
            .get(key)
            .map(String::as_str)
            .or_else(|| resolver::default_for(key))
            .unwrap_or("")
    }

    fn number<T: FromStr>(&self, key: &'static str, expected: &'static str) -> Result<T, ConfigError> {
        let value = self.raw(key);
        value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_owned(),
            expected,
        })
    }

    /// Panel side in pixels, limited to what a 16-bit window address can
    /// reach.
    fn dimension(&self, key: &'static str) -> Result<u32, ConfigError> {
        const EXPECTED: &str = "size in pixels (1 to 65535)";
        let n: u32 = self.number(key, EXPECTED)?;
        if n == 0 || n > u32::from(u16::MAX) {
            return Err(ConfigError::Invalid {
                key,
                value: self.raw(key).to_owned(),
                expected: EXPECTED,
            });
        }
        Ok(n)
    }

    fn pin(&self, key: &'static str) -> Result<PinAssignment, ConfigError> {
        let value = self.raw(key);
        PinAssignment::parse(value).ok_or_else(|| ConfigError::Invalid {
            key,
            value: value.to_owned(),
            expected: "GPIO number (or -1 to disable)",
        })
    }

    fn flag(&self, key: &str) -> bool {
        parse_flag(self.raw(key))
    }
}

/// `1 true yes on` (any case) are true; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn defaults_parse() {
        let config = Config::from_settings(&Settings::new()).unwrap();
        assert_eq!(config.display.dc, 9);
        assert_eq!(config.display.backlight, PinAssignment::Gpio(19));
        assert_eq!(config.display.reset, PinAssignment::Disabled);
        assert_eq!(config.display.rotation, Rotation::Degrees90);
        assert!(config.display.backlight_active_high);
        assert!(!config.display.invert);
        assert_eq!(config.display.preset, None);
        assert!(config.input.active_low);
        assert_eq!(config.input.debounce(), Duration::from_millis(50));
        assert_eq!(config.input.pins.len(), 7);
        assert_eq!(
            config.input.pins[0],
            ButtonPin {
                button: Button::Up,
                pin: PinAssignment::Gpio(6)
            }
        );
    }

    #[test]
    fn negative_pins_are_disabled() {
        assert_eq!(PinAssignment::parse("-1"), Some(PinAssignment::Disabled));
        assert_eq!(PinAssignment::parse("-7"), Some(PinAssignment::Disabled));
        assert_eq!(PinAssignment::parse(" 26 "), Some(PinAssignment::Gpio(26)));
        assert_eq!(PinAssignment::parse("256"), None);
        assert_eq!(PinAssignment::parse("GPIO5"), None);
    }

    #[test]
    fn flags_accept_common_spellings() {
        for v in ["1", "true", "True", "YES", "on"] {
            assert!(parse_flag(v), "{v}");
        }
        for v in ["0", "false", "", "off", "2"] {
            assert!(!parse_flag(v), "{v}");
        }
    }

    #[test]
    fn poll_interval_defaults_to_debounce_with_floor() {
        let short = Config::from_settings(&settings(&[("BTN_DEBOUNCE_MS", "5")])).unwrap();
        assert_eq!(short.input.poll_interval(), Duration::from_millis(20));

        let long = Config::from_settings(&settings(&[("BTN_DEBOUNCE_MS", "150")])).unwrap();
        assert_eq!(long.input.poll_interval(), Duration::from_millis(150));

        let explicit = Config::from_settings(&settings(&[
            ("BTN_DEBOUNCE_MS", "150"),
            ("BTN_POLL_MS", "10"),
        ]))
        .unwrap();
        assert_eq!(explicit.input.poll_interval(), Duration::from_millis(10));
    }

    #[test]
    fn invalid_values_name_their_key() {
        let err = Config::from_settings(&settings(&[("LCD_ROT", "45")])).unwrap_err();
        assert!(err.to_string().starts_with("LCD_ROT"), "{err}");

        let err = Config::from_settings(&settings(&[("LCD_SPEED", "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LCD_SPEED", .. }));

        let err = Config::from_settings(&settings(&[("LCD_DC", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::PinRequired("LCD_DC")));

        let err = Config::from_settings(&settings(&[("BTN_POLL_MS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BTN_POLL_MS", .. }));
    }

    #[test]
    fn panel_sides_must_be_addressable() {
        for (key, value) in [
            ("LCD_WIDTH", "0"),
            ("LCD_HEIGHT", "65536"),
            ("LCD_WIDTH", "4294967295"),
        ] {
            let err = Config::from_settings(&settings(&[(key, value)])).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { key: k, .. } if *k == key),
                "{key}={value}: {err}"
            );
        }

        let widest = Config::from_settings(&settings(&[("LCD_WIDTH", "65535")])).unwrap();
        assert_eq!(widest.display.width, 65535);
    }

    #[test]
    fn ping_pacing_defaults_and_overrides() {
        let defaults = Config::from_settings(&Settings::new()).unwrap();
        assert_eq!(
            defaults.ping,
            PingConfig {
                cycles: 2,
                delay_ms: 500
            }
        );

        let quick = Config::from_settings(&settings(&[("LCD_CYCLES", "0"), ("LCD_DELAY_MS", "0")])).unwrap();
        assert_eq!(quick.ping.cycles, 0);
        assert_eq!(quick.ping.delay(), Duration::ZERO);

        let err = Config::from_settings(&settings(&[("LCD_CYCLES", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LCD_CYCLES", .. }));
    }

    #[test]
    fn button_specs_share_polarity_and_window() {
        let config = Config::from_settings(&settings(&[
            ("BTN_ACTIVE_LOW", "0"),
            ("BTN_B", "-1"),
        ]))
        .unwrap();
        let specs = config.input.button_specs();
        assert!(specs.iter().all(|s| s.polarity == Polarity::ActiveHigh));
        assert_eq!(specs.last().unwrap().pin, PinAssignment::Disabled);
    }

    #[test]
    fn visible_size_follows_rotation() {
        let config = Config::from_settings(&settings(&[
            ("LCD_WIDTH", "160"),
            ("LCD_HEIGHT", "128"),
            ("LCD_ROT", "270"),
        ]))
        .unwrap();
        assert_eq!(config.display.visible_size(), Size::new(128, 160));
        assert_eq!(config.display.minimal_params().width, 160);
    }
}
