//! GPIO and pin abstraction layer
//!
//! Input pins with optional edge-interrupt support, claimed from a
//! [`GpioBackend`]. The input manager only ever talks to these traits, so a
//! session can run against real Raspberry Pi GPIO or the host mocks.

use core::ops::Not;

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

impl Not for PinState {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl core::fmt::Display for PinState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Low => f.write_str("low"),
        }
    }
}

/// Bias resistor applied when a pin is claimed as an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    /// Pull-up (idle high, for active-low buttons)
    Up,
    /// Pull-down (idle low, for active-high buttons)
    Down,
    /// No bias
    Floating,
}

impl Pull {
    /// Level a pin settles at when nothing drives it.
    pub fn idle_level(self) -> PinState {
        match self {
            Self::Up => PinState::High,
            Self::Down | Self::Floating => PinState::Low,
        }
    }
}

/// External interrupt configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    /// Trigger on rising edge
    RisingEdge,
    /// Trigger on falling edge
    FallingEdge,
    /// Trigger on both edges
    BothEdges,
}

/// Callback invoked with the level a pin settled at after an edge.
///
/// Runs on whatever thread the platform delivers interrupts on, so it must
/// be `Send` and should only hand the level off (e.g. into a channel).
pub type EdgeCallback = Box<dyn FnMut(PinState) + Send + 'static>;

/// Input pin operations
pub trait InputPin {
    /// Error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// BCM number of this pin.
    fn number(&self) -> u8;

    /// Sample the raw electrical level.
    fn read(&self) -> Result<PinState, Self::Error>;

    /// Read pin state
    fn is_high(&self) -> Result<bool, Self::Error> {
        self.read().map(bool::from)
    }

    /// Read pin state (inverted)
    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|v| !v)
    }
}

/// Pin with interrupt capability
pub trait InterruptPin: InputPin {
    /// Register `callback` for edges matching `mode`.
    ///
    /// Fails when the kernel refuses the registration, typically because
    /// another driver or overlay already owns the line's edge events.
    fn enable_interrupt(
        &mut self,
        mode: InterruptMode,
        callback: EdgeCallback,
    ) -> Result<(), Self::Error>;

    /// Release the edge registration. A no-op when none is active.
    fn disable_interrupt(&mut self) -> Result<(), Self::Error>;
}

/// Source of input pins (a GPIO controller).
pub trait GpioBackend {
    /// Pin handle handed out by [`claim_input`](Self::claim_input).
    type Pin: InterruptPin + Send + 'static;
    /// Error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Claim `pin` as an input with the given bias.
    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<Self::Pin, Self::Error>;
}
