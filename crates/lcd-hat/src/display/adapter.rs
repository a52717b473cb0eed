//! Display driver adapter
//!
//! Builds a [`PanelHandle`] with the widest feature set the driver allows and
//! degrades instead of failing:
//!
//! ```text
//! capabilities ≠ none ──► construct_extended ──ok──────────────┐
//!        │                        │ err (logged once)          │
//!        ▼                        ▼                            ▼
//!   construct_minimal ◄───────────┘            runtime setters for anything
//!        │ err → HardwareInitError (fatal)     the constructor did not apply
//!        └────────────────────────────────────►  (unsupported → skipped)
//! ```
//!
//! Missing features cost visual fidelity (shifted window, wrong inversion,
//! inverted backlight) but never abort start-up.

use embedded_graphics::prelude::Size;
use panel_specs::DriverCapabilities;
use platform::{ExtendedParams, Frame, Panel, PanelBackend};
use tracing::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::error::{DisplayError, ExtendedInitError, HardwareInitError};

/// Which constructor produced the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Extended parameter set
    Extended,
    /// Minimal parameter set
    Minimal,
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Extended => f.write_str("extended"),
            Self::Minimal => f.write_str("minimal"),
        }
    }
}

/// Exclusively owned, initialised display.
///
/// Every frame push and backlight change goes through the handle. Dropping
/// it (or calling [`off`](Self::off)) releases the panel.
#[derive(Debug)]
pub struct PanelHandle<P> {
    panel: P,
    window: Size,
    tier: Tier,
    probed: DriverCapabilities,
    applied: DriverCapabilities,
    backlight_active_high: bool,
    backlight: Option<bool>,
}

/// Build a panel from `config`, using `capabilities` to pick the tier.
///
/// Switches the backlight on once the panel is up.
pub fn init<B: PanelBackend>(
    backend: &mut B,
    config: &DisplayConfig,
    capabilities: DriverCapabilities,
) -> Result<PanelHandle<B::Panel>, HardwareInitError> {
    let (mut panel, tier, mut applied) = match construct_extended(backend, config, capabilities) {
        Some(panel) => (panel, Tier::Extended, capabilities),
        None => {
            let panel = backend
                .construct_minimal(&config.minimal_params())
                .map_err(HardwareInitError::minimal)?;
            (panel, Tier::Minimal, DriverCapabilities::NONE)
        }
    };

    apply_at_runtime(&mut panel, config, &mut applied);

    if config.has_offset() && !applied.offset_window {
        warn!(
            ox = config.offset_x,
            oy = config.offset_y,
            "driver cannot offset the window, image may be shifted"
        );
    }

    let window = config.visible_size();
    if panel.size() != window {
        warn!(
            panel_width = panel.size().width,
            panel_height = panel.size().height,
            width = window.width,
            height = window.height,
            "panel reports a different window than configured"
        );
    }

    let mut handle = PanelHandle {
        panel,
        window,
        tier,
        probed: capabilities,
        applied,
        backlight_active_high: config.backlight_active_high,
        backlight: None,
    };

    if let Err(error) = handle.set_backlight(true) {
        warn!(%error, "could not switch backlight on");
    }

    info!(
        %tier,
        features = %applied,
        width = window.width,
        height = window.height,
        rotation = config.rotation.degrees(),
        "display ready"
    );
    Ok(handle)
}

fn construct_extended<B: PanelBackend>(
    backend: &mut B,
    config: &DisplayConfig,
    capabilities: DriverCapabilities,
) -> Option<B::Panel> {
    if capabilities.is_empty() {
        debug!("driver has no optional features, using minimal constructor");
        return None;
    }

    let params = ExtendedParams {
        base: config.minimal_params(),
        offset: capabilities
            .offset_window
            .then_some((config.offset_x, config.offset_y)),
        invert: capabilities.invert.then_some(config.invert),
        backlight_active_high: capabilities
            .backlight_polarity
            .then_some(config.backlight_active_high),
    };

    match backend.construct_extended(&params) {
        Ok(panel) => Some(panel),
        Err(source) => {
            let error = ExtendedInitError(source);
            warn!(%error, cause = %error.0);
            None
        }
    }
}

/// Apply inversion and backlight polarity through the panel's setters when
/// the constructor did not take them. Unsupported setters are skipped.
fn apply_at_runtime<P: Panel>(
    panel: &mut P,
    config: &DisplayConfig,
    applied: &mut DriverCapabilities,
) {
    if config.invert && !applied.invert {
        match panel.set_inverted(true) {
            Ok(()) => applied.invert = true,
            Err(error) => debug!(%error, "skipping runtime inversion"),
        }
    }

    if !applied.backlight_polarity {
        match panel.set_backlight_polarity(config.backlight_active_high) {
            Ok(()) => applied.backlight_polarity = true,
            Err(error) => debug!(%error, "skipping runtime backlight polarity"),
        }
    }
}

impl<P: Panel> PanelHandle<P> {
    /// Push a whole frame. It must match the visible window exactly.
    pub fn draw_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if frame.size() != self.window {
            return Err(DisplayError::FrameSize {
                width: self.window.width,
                height: self.window.height,
                actual_width: frame.size().width,
                actual_height: frame.size().height,
            });
        }
        self.panel.draw_frame(frame)?;
        Ok(())
    }

    /// Switch the backlight, honouring the configured polarity.
    ///
    /// When the driver could not take the polarity itself the request is
    /// inverted here for active-low backlights.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let request = if self.applied.backlight_polarity || self.backlight_active_high {
            on
        } else {
            !on
        };
        self.panel.set_backlight(request)?;
        self.backlight = Some(on);
        Ok(())
    }

    /// Black out the window and switch the backlight off. Idempotent.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.draw_frame(&Frame::new(self.window))?;
        self.set_backlight(false)
    }

    /// [`clear`](Self::clear) and release the panel.
    pub fn off(mut self) -> Result<(), DisplayError> {
        self.clear()
    }

    /// Visible window; frames must be exactly this size.
    pub fn window(&self) -> Size {
        self.window
    }

    /// Constructor tier that produced the panel.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Capabilities reported by the probe.
    pub fn probed(&self) -> DriverCapabilities {
        self.probed
    }

    /// Features that actually took effect, by constructor or setter.
    pub fn applied(&self) -> DriverCapabilities {
        self.applied
    }

    /// Last logical backlight state requested.
    pub fn backlight(&self) -> Option<bool> {
        self.backlight
    }

    /// The wrapped panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }
}
