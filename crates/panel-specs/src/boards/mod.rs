//! Named hardware presets
//!
//! A preset is a partial set of configuration values for one board. The
//! configuration resolver layers it between built-in defaults and the
//! user's own settings, so any key the user sets explicitly wins.

pub mod waveshare;

pub use waveshare::WAVESHARE_1IN44_LCD_HAT;

/// Partial configuration for one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoardPreset {
    /// Canonical preset name
    pub name: &'static str,
    /// Other accepted names
    pub aliases: &'static [&'static str],
    /// Human-readable board name
    pub description: &'static str,
    /// `(KEY, VALUE)` pairs the preset supplies
    pub settings: &'static [(&'static str, &'static str)],
}

impl BoardPreset {
    /// `true` if `name` is this preset's name or one of its aliases
    /// (case-insensitive).
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Value the preset supplies for `key`.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.settings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}

/// Every known preset.
pub const PRESETS: &[BoardPreset] = &[WAVESHARE_1IN44_LCD_HAT];

/// Find a preset by name or alias.
pub fn find_preset(name: &str) -> Option<&'static BoardPreset> {
    PRESETS.iter().find(|p| p.answers_to(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        for name in ["waveshare144", "Waveshare-1.44", "WAVESHARE", " waveshare "] {
            assert_eq!(find_preset(name), Some(&WAVESHARE_1IN44_LCD_HAT), "{name}");
        }
        assert_eq!(find_preset("pimoroni"), None);
    }

    #[test]
    fn waveshare_wiring() {
        let preset = WAVESHARE_1IN44_LCD_HAT;
        assert_eq!(preset.get("LCD_DC"), Some("25"));
        assert_eq!(preset.get("LCD_BL"), Some("24"));
        assert_eq!(preset.get("LCD_RST"), Some("27"));
        assert_eq!(preset.get("LCD_OX"), Some("2"));
        assert_eq!(preset.get("LCD_OY"), Some("3"));
        assert_eq!(preset.get("BTN_UP"), None);
    }
}
