//! Layered settings resolution.

use panel_specs::find_preset;
use tracing::debug;

use super::{keys, ConfigError, Settings};

/// Built-in defaults, lowest precedence.
pub const DEFAULTS: &[(&str, &str)] = &[
    (keys::LCD_PRESET, ""),
    (keys::LCD_PORT, "0"),
    (keys::LCD_CS, "0"),
    (keys::LCD_DC, "9"),
    (keys::LCD_BL, "19"),
    (keys::LCD_RST, "-1"),
    (keys::LCD_ROT, "90"),
    (keys::LCD_SPEED, "4000000"),
    (keys::LCD_WIDTH, "128"),
    (keys::LCD_HEIGHT, "128"),
    (keys::LCD_OX, "0"),
    (keys::LCD_OY, "0"),
    (keys::LCD_INVERT, "0"),
    (keys::LCD_BL_ACTIVE, "1"),
    ("BTN_UP", "6"),
    ("BTN_DOWN", "19"),
    ("BTN_LEFT", "5"),
    ("BTN_RIGHT", "26"),
    ("BTN_CENTER", "13"),
    ("BTN_A", "21"),
    ("BTN_B", "20"),
    (keys::BTN_ACTIVE_LOW, "1"),
    (keys::BTN_DEBOUNCE_MS, "50"),
    (keys::BTN_POLL_MS, ""),
    (keys::LCD_CYCLES, "2"),
    (keys::LCD_DELAY_MS, "500"),
];

pub(super) fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Merges settings layers.
///
/// Precedence, lowest to highest: [`DEFAULTS`], the preset named by
/// `LCD_PRESET`, the settings file, overrides. A preset therefore only fills
/// keys the user did not set explicitly.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    file: Settings,
    overrides: Settings,
}

impl Resolver {
    /// Resolver with no file and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `settings` as the file layer.
    #[must_use]
    pub fn with_file(mut self, settings: Settings) -> Self {
        self.file = settings;
        self
    }

    /// Add overrides; later calls win over earlier ones.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Settings) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Add a single override.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Merge all layers.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let mut merged: Settings = DEFAULTS
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        let preset_name = self
            .overrides
            .get(keys::LCD_PRESET)
            .or_else(|| self.file.get(keys::LCD_PRESET))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty());

        if let Some(name) = preset_name {
            let preset =
                find_preset(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_owned()))?;
            debug!(preset = preset.name, board = preset.description, "applying board preset");
            for (key, value) in preset.settings {
                merged.insert((*key).to_owned(), (*value).to_owned());
            }
        }

        merged.extend(self.file.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(self.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(merged)
    }
}

/// Known keys present in the process environment.
pub fn env_overrides() -> Settings {
    std::env::vars()
        .filter(|(key, _)| keys::ALL.contains(&key.as_str()))
        .collect()
}
