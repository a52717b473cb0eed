//! `lcd.env` settings file (read only).
//!
//! One `KEY=VALUE` per line. Blank lines and `#` comments are skipped, a
//! leading `export ` is tolerated and matching quotes around the value are
//! stripped. Lines without `=` are ignored.

use std::path::Path;

use tracing::debug;

use super::{ConfigError, Settings};

/// Default file name, looked up in the working directory.
pub const DEFAULT_FILE_NAME: &str = "lcd.env";

/// Parse file contents.
pub fn parse(text: &str) -> Settings {
    let mut settings = Settings::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            debug!(line = number + 1, "skipping settings line without `=`");
            continue;
        };
        settings.insert(key.trim().to_owned(), unquote(value.trim()).to_owned());
    }
    settings
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Read and parse a settings file.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(parse(&text))
}

/// Like [`load`], but a missing file yields `None` instead of an error.
pub fn load_if_present(path: &Path) -> Result<Option<Settings>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse(&text))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}
