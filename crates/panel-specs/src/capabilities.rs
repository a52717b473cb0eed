//! Optional-feature support per driver revision
//!
//! Drivers for the same controller differ in which optional constructor
//! parameters they accept. Rather than probing a constructor at runtime, each
//! supported driver revision is listed here with the features it is known to
//! honour. New driver versions are added to [`DRIVER_TABLE`] as they are
//! integrated; anything not listed gets [`DriverCapabilities::NONE`] and is
//! built with the minimal parameter set.
//!
//! # Sources
//!
//! - `st7735`: the native driver in the `lcd-hat` crate. Window offsets,
//!   INVON/INVOFF and backlight polarity are all constructor options and
//!   runtime setters.
//! - `st7735-lcd`: offset via `set_offset`, inversion as a constructor flag,
//!   backlight left to the caller.
//! - `mipidsi`: `display_offset` and `invert_colors` on the builder, no
//!   backlight control.
//! - `fbtft`: kernel framebuffer overlay; geometry and polarity come from the
//!   device tree, nothing is configurable from user space.

/// Optional panel features a driver honours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverCapabilities {
    /// Visible window offset inside controller RAM.
    pub offset_window: bool,
    /// Colour inversion.
    pub invert: bool,
    /// Active-low backlight handling.
    pub backlight_polarity: bool,
}

impl DriverCapabilities {
    /// No optional feature.
    pub const NONE: Self = Self {
        offset_window: false,
        invert: false,
        backlight_polarity: false,
    };

    /// Every optional feature.
    pub const ALL: Self = Self {
        offset_window: true,
        invert: true,
        backlight_polarity: true,
    };

    /// `true` when no optional feature is supported.
    pub const fn is_empty(&self) -> bool {
        !(self.offset_window || self.invert || self.backlight_polarity)
    }

    /// Features present in both sets.
    #[must_use]
    pub const fn intersection(&self, other: &Self) -> Self {
        Self {
            offset_window: self.offset_window && other.offset_window,
            invert: self.invert && other.invert,
            backlight_polarity: self.backlight_polarity && other.backlight_polarity,
        }
    }
}

impl core::fmt::Display for DriverCapabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names = [
            (self.offset_window, "offset-window"),
            (self.invert, "invert"),
            (self.backlight_polarity, "backlight-polarity"),
        ];
        let mut first = true;
        for (_, name) in names.iter().filter(|(on, _)| *on) {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Driver version, compared numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverVersion {
    /// Major
    pub major: u16,
    /// Minor
    pub minor: u16,
    /// Patch
    pub patch: u16,
}

impl DriverVersion {
    /// Build a version from its parts.
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `major[.minor[.patch]]`, ignoring any `-pre` / `+build` suffix.
    pub fn parse(text: &str) -> Option<Self> {
        let core = text
            .trim()
            .trim_start_matches('v')
            .split(['-', '+'])
            .next()?;
        let mut parts = core.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }
}

impl core::fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One row of the capability table: a driver version range and its features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverRevision {
    /// Driver name as reported by the backend.
    pub driver: &'static str,
    /// First version covered (inclusive).
    pub since: DriverVersion,
    /// First version no longer covered (exclusive); `None` = open-ended.
    pub until: Option<DriverVersion>,
    /// Features honoured in this range.
    pub capabilities: DriverCapabilities,
}

impl DriverRevision {
    /// `true` if this row covers `driver` at `version`.
    pub fn covers(&self, driver: &str, version: DriverVersion) -> bool {
        self.driver.eq_ignore_ascii_case(driver)
            && version >= self.since
            && self.until.map_or(true, |until| version < until)
    }
}

const OFFSET_AND_INVERT: DriverCapabilities = DriverCapabilities {
    offset_window: true,
    invert: true,
    backlight_polarity: false,
};

/// Known driver revisions.
pub const DRIVER_TABLE: &[DriverRevision] = &[
    DriverRevision {
        driver: "st7735",
        since: DriverVersion::new(0, 1, 0),
        until: None,
        capabilities: DriverCapabilities::ALL,
    },
    DriverRevision {
        driver: "st7735-lcd",
        since: DriverVersion::new(0, 8, 0),
        until: None,
        capabilities: OFFSET_AND_INVERT,
    },
    DriverRevision {
        driver: "st7735-lcd",
        since: DriverVersion::new(0, 0, 0),
        until: Some(DriverVersion::new(0, 8, 0)),
        capabilities: DriverCapabilities {
            offset_window: false,
            invert: true,
            backlight_polarity: false,
        },
    },
    DriverRevision {
        driver: "mipidsi",
        since: DriverVersion::new(0, 7, 0),
        until: None,
        capabilities: OFFSET_AND_INVERT,
    },
    DriverRevision {
        driver: "fbtft",
        since: DriverVersion::new(0, 0, 0),
        until: None,
        capabilities: DriverCapabilities::NONE,
    },
];

/// Look up the capabilities of `driver` at `version`.
///
/// Returns `None` for drivers or versions the table does not know.
pub fn capabilities_for(driver: &str, version: DriverVersion) -> Option<DriverCapabilities> {
    DRIVER_TABLE
        .iter()
        .find(|rev| rev.covers(driver, version))
        .map(|rev| rev.capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_and_suffixed_versions() {
        assert_eq!(DriverVersion::parse("0.1.0"), Some(DriverVersion::new(0, 1, 0)));
        assert_eq!(DriverVersion::parse("v1.2"), Some(DriverVersion::new(1, 2, 0)));
        assert_eq!(DriverVersion::parse("0.9.1-rc.1"), Some(DriverVersion::new(0, 9, 1)));
        assert_eq!(DriverVersion::parse("1.2.3.4"), None);
        assert_eq!(DriverVersion::parse("abc"), None);
        assert_eq!(DriverVersion::parse(""), None);
    }

    #[test]
    fn native_driver_supports_everything() {
        let caps = capabilities_for("st7735", DriverVersion::new(0, 1, 0));
        assert_eq!(caps, Some(DriverCapabilities::ALL));
    }

    #[test]
    fn version_ranges_are_half_open() {
        let old = capabilities_for("st7735-lcd", DriverVersion::new(0, 7, 9)).unwrap();
        let new = capabilities_for("st7735-lcd", DriverVersion::new(0, 8, 0)).unwrap();
        assert!(!old.offset_window);
        assert!(new.offset_window);
    }

    #[test]
    fn unknown_driver_has_no_entry() {
        assert_eq!(capabilities_for("ili9341", DriverVersion::new(1, 0, 0)), None);
        assert_eq!(capabilities_for("st7735", DriverVersion::new(0, 0, 9)), None);
    }

    #[test]
    fn display_lists_features() {
        assert_eq!(DriverCapabilities::NONE.to_string(), "none");
        assert_eq!(OFFSET_AND_INVERT.to_string(), "offset-window,invert");
        assert!(DriverCapabilities::ALL
            .intersection(&DriverCapabilities::NONE)
            .is_empty());
    }
}
