//! Mock panel backend and panel.

use std::sync::{Arc, Mutex};

use embedded_graphics::prelude::*;

use super::lock;
use crate::display::{
    CapabilityProbeError, DriverIdentity, ExtendedParams, Frame, MinimalParams, Panel,
    PanelBackend, PanelError, PanelFeature,
};
use crate::gpio::PinState;

/// One constructor call recorded by [`MockPanelBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construction {
    /// `construct_extended` was called with these parameters.
    Extended(ExtendedParams),
    /// `construct_minimal` was called with these parameters.
    Minimal(MinimalParams),
}

/// Mock panel backend.
///
/// Configure which constructor tiers succeed and which runtime setters the
/// produced panels expose; every constructor call is recorded.
#[derive(Debug, Clone)]
pub struct MockPanelBackend {
    identity: Option<DriverIdentity>,
    reject_extended: bool,
    fail_minimal: bool,
    runtime_invert: bool,
    runtime_polarity: bool,
    constructions: Arc<Mutex<Vec<Construction>>>,
}

impl MockPanelBackend {
    /// Backend reporting the given driver identity. Both tiers succeed and
    /// panels expose both runtime setters.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            identity: Some(DriverIdentity::new(name, version)),
            reject_extended: false,
            fail_minimal: false,
            runtime_invert: true,
            runtime_polarity: true,
            constructions: Arc::default(),
        }
    }

    /// Make `identity()` fail.
    #[must_use]
    pub fn without_identity(mut self) -> Self {
        self.identity = None;
        self
    }

    /// Make `construct_extended` refuse its optional parameters.
    #[must_use]
    pub fn rejecting_extended(mut self) -> Self {
        self.reject_extended = true;
        self
    }

    /// Make `construct_minimal` fail as if the SPI device were missing.
    #[must_use]
    pub fn failing_minimal(mut self) -> Self {
        self.fail_minimal = true;
        self
    }

    /// Choose whether produced panels expose `set_inverted` /
    /// `set_backlight_polarity`.
    #[must_use]
    pub fn with_runtime_setters(mut self, invert: bool, polarity: bool) -> Self {
        self.runtime_invert = invert;
        self.runtime_polarity = polarity;
        self
    }

    /// Constructor calls so far, oldest first.
    pub fn constructions(&self) -> Vec<Construction> {
        lock(&self.constructions).clone()
    }

    fn panel(&self, base: &MinimalParams) -> MockPanel {
        MockPanel {
            size: base.visible_size(),
            offset: (0, 0),
            inverted: false,
            backlight_active_high: true,
            backlight_level: None,
            frames: Vec::new(),
            runtime_invert: self.runtime_invert,
            runtime_polarity: self.runtime_polarity,
        }
    }
}

impl PanelBackend for MockPanelBackend {
    type Panel = MockPanel;

    fn identity(&self) -> Result<DriverIdentity, CapabilityProbeError> {
        self.identity
            .clone()
            .ok_or_else(|| CapabilityProbeError::Unavailable("mock backend has no identity".into()))
    }

    fn construct_extended(&mut self, params: &ExtendedParams) -> Result<Self::Panel, PanelError> {
        lock(&self.constructions).push(Construction::Extended(params.clone()));
        if self.reject_extended {
            let first = if params.offset.is_some() {
                "offset"
            } else if params.invert.is_some() {
                "invert"
            } else {
                "backlight_active_high"
            };
            return Err(PanelError::RejectedParameter(first));
        }
        let mut panel = self.panel(&params.base);
        if let Some(offset) = params.offset {
            panel.offset = offset;
        }
        if let Some(invert) = params.invert {
            panel.inverted = invert;
        }
        if let Some(active_high) = params.backlight_active_high {
            panel.backlight_active_high = active_high;
        }
        Ok(panel)
    }

    fn construct_minimal(&mut self, params: &MinimalParams) -> Result<Self::Panel, PanelError> {
        lock(&self.constructions).push(Construction::Minimal(params.clone()));
        if self.fail_minimal {
            return Err(PanelError::device(
                format!("open /dev/spidev{}.{}", params.port, params.cs),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        Ok(self.panel(params))
    }
}

/// Mock panel that records frames and control-line state.
#[derive(Debug, Clone)]
pub struct MockPanel {
    size: Size,
    offset: (u16, u16),
    inverted: bool,
    backlight_active_high: bool,
    backlight_level: Option<PinState>,
    frames: Vec<Frame>,
    runtime_invert: bool,
    runtime_polarity: bool,
}

impl MockPanel {
    /// Window offset the panel was built with.
    pub fn offset(&self) -> (u16, u16) {
        self.offset
    }

    /// Whether colour inversion is active.
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Backlight polarity the panel believes in.
    pub fn backlight_active_high(&self) -> bool {
        self.backlight_active_high
    }

    /// Electrical level last driven on the backlight pin.
    pub fn backlight_level(&self) -> Option<PinState> {
        self.backlight_level
    }

    /// Every frame pushed so far.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Panel for MockPanel {
    fn size(&self) -> Size {
        self.size
    }

    fn draw_frame(&mut self, frame: &Frame) -> Result<(), PanelError> {
        if frame.size() != self.size {
            return Err(PanelError::FrameSize {
                width: self.size.width,
                height: self.size.height,
                actual_width: frame.size().width,
                actual_height: frame.size().height,
            });
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), PanelError> {
        self.backlight_level = Some(PinState::from(on == self.backlight_active_high));
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), PanelError> {
        if !self.runtime_invert {
            return Err(PanelError::Unsupported(PanelFeature::Invert));
        }
        self.inverted = inverted;
        Ok(())
    }

    fn set_backlight_polarity(&mut self, active_high: bool) -> Result<(), PanelError> {
        if !self.runtime_polarity {
            return Err(PanelError::Unsupported(PanelFeature::BacklightPolarity));
        }
        self.backlight_active_high = active_high;
        Ok(())
    }
}
