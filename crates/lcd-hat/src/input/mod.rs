//! Debounced button input
//!
//! Each configured button is watched by edge callbacks when the platform
//! grants them and by periodic sampling when it does not. Both paths feed
//! the same [`Debouncer`], so the events a consumer sees do not depend on
//! how a pin is watched.
//!
//! ```text
//! edge callback ──► unbounded channel ──┐
//!                                       ├─► InputSession loop ──► Debouncer ──► EventSink
//! poll tick ────► InputPin::read ───────┘        (one task)
//! ```

pub mod debounce;
mod manager;
pub mod sink;
mod state;

use std::time::Duration;

use platform::{Button, PinState, Pull};
use serde::Serialize;

use crate::config::PinAssignment;

pub use debounce::Debouncer;
pub use manager::InputSession;
pub use sink::{channel, ChannelSink, EventSink, FnSink, InputEvents, LogSink, CHANNEL_DEPTH};
pub use state::WatchState;

/// Which electrical level means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Pressed pulls the line low (pull-up bias)
    ActiveLow,
    /// Pressed drives the line high (pull-down bias)
    ActiveHigh,
}

impl Polarity {
    /// `true` if `level` means pressed.
    pub fn is_active(self, level: PinState) -> bool {
        (level == PinState::High) != (self == Self::ActiveLow)
    }

    /// Bias that holds the line at its released level.
    pub fn pull(self) -> Pull {
        match self {
            Self::ActiveLow => Pull::Up,
            Self::ActiveHigh => Pull::Down,
        }
    }

    /// Level of a released button.
    pub fn idle_level(self) -> PinState {
        self.pull().idle_level()
    }
}

/// One button to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSpec {
    /// Logical name
    pub button: Button,
    /// GPIO, or disabled
    pub pin: PinAssignment,
    /// Electrical meaning of "pressed"
    pub polarity: Polarity,
    /// Minimum time a new level must hold before it is reported
    pub debounce: Duration,
}
