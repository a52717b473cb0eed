//! Input device abstraction

use tokio::time::Instant;

/// Input device trait for buttons and the joystick
pub trait InputDevice {
    /// Wait for next input event.
    ///
    /// Returns `None` once the producing session has ended.
    fn wait_for_event(&mut self) -> impl core::future::Future<Output = Option<InputEvent>> + Send;

    /// Poll for event (non-blocking)
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// A debounced press or release of one logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Which button changed.
    pub button: Button,
    /// Direction of the change.
    pub transition: Transition,
    /// When the new level became stable (last raw change + debounce window).
    pub at: Instant,
}

impl InputEvent {
    /// Pressed event for `button` at `at`.
    pub fn pressed(button: Button, at: Instant) -> Self {
        Self {
            button,
            transition: Transition::Pressed,
            at,
        }
    }

    /// Released event for `button` at `at`.
    pub fn released(button: Button, at: Instant) -> Self {
        Self {
            button,
            transition: Transition::Released,
            at,
        }
    }
}

/// Stable transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The button reached its active level.
    Pressed,
    /// The button left its active level.
    Released,
}

impl Transition {
    /// Transition that leads into the given logical state.
    pub fn into_state(active: bool) -> Self {
        if active {
            Self::Pressed
        } else {
            Self::Released
        }
    }

    /// Lower-case name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
        }
    }
}

impl core::fmt::Display for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical buttons on the LCD HAT
///
/// Five joystick directions plus two side keys. The HAT's third key (KEY3)
/// is not wired to a logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    /// Joystick up
    Up,
    /// Joystick down
    Down,
    /// Joystick left
    Left,
    /// Joystick right
    Right,
    /// Joystick press
    Center,
    /// Side key A
    A,
    /// Side key B
    B,
}

impl Button {
    /// Every button, in configuration order.
    pub const ALL: [Button; 7] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Center,
        Button::A,
        Button::B,
    ];

    /// Configuration key holding this button's pin (also its log name).
    pub fn key(self) -> &'static str {
        match self {
            Self::Up => "BTN_UP",
            Self::Down => "BTN_DOWN",
            Self::Left => "BTN_LEFT",
            Self::Right => "BTN_RIGHT",
            Self::Center => "BTN_CENTER",
            Self::A => "BTN_A",
            Self::B => "BTN_B",
        }
    }

    /// Look a button up by its configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::from_key(button.key()), Some(button));
        }
        assert_eq!(Button::from_key("BTN_KEY3"), None);
    }

    #[test]
    fn transition_follows_logical_state() {
        assert_eq!(Transition::into_state(true), Transition::Pressed);
        assert_eq!(Transition::into_state(false).to_string(), "released");
    }
}
