//! Scriptable GPIO controller.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::lock;
use crate::gpio::{EdgeCallback, GpioBackend, InputPin, InterruptMode, InterruptPin, PinState, Pull};

/// Errors produced by [`MockGpio`] and its pins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockGpioError {
    /// Pin already claimed (or configured to refuse claims).
    #[error("GPIO{0} is already in use")]
    Busy(u8),
    /// Edge registration refused.
    #[error("edge detection unavailable on GPIO{0}: line owned by another driver")]
    EdgeUnavailable(u8),
    /// Injected read failure.
    #[error("read of GPIO{0} failed")]
    Read(u8),
}

#[derive(Default)]
struct GpioState {
    levels: HashMap<u8, PinState>,
    claimed: HashSet<u8>,
    armed: HashSet<u8>,
    callbacks: HashMap<u8, EdgeCallback>,
    refuse_edges: HashSet<u8>,
    refuse_claims: HashSet<u8>,
    failing_reads: HashMap<u8, u32>,
    edge_attempts: HashMap<u8, u32>,
    reads: HashMap<u8, u32>,
}

/// Mock GPIO controller.
///
/// Levels are driven with [`set_level`](Self::set_level); a level change on a
/// pin with an armed interrupt invokes its callback synchronously, like a
/// kernel edge event delivered from another thread.
#[derive(Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
}

impl MockGpio {
    /// Create a controller with every pin free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make edge registration fail on `pin`.
    pub fn refuse_edges(&self, pin: u8) -> &Self {
        lock(&self.state).refuse_edges.insert(pin);
        self
    }

    /// Make claiming `pin` fail.
    pub fn refuse_claim(&self, pin: u8) -> &Self {
        lock(&self.state).refuse_claims.insert(pin);
        self
    }

    /// Make the next `count` reads of `pin` fail.
    pub fn fail_reads(&self, pin: u8, count: u32) -> &Self {
        lock(&self.state).failing_reads.insert(pin, count);
        self
    }

    /// Drive `pin` to `level`, firing its edge callback if the level changed.
    pub fn set_level(&self, pin: u8, level: PinState) {
        let callback = {
            let mut state = lock(&self.state);
            let previous = state.levels.insert(pin, level);
            if previous == Some(level) {
                return;
            }
            state.callbacks.remove(&pin)
        };

        // Invoke outside the lock so the callback may touch the controller.
        if let Some(mut callback) = callback {
            callback(level);
            let mut state = lock(&self.state);
            if state.armed.contains(&pin) {
                state.callbacks.entry(pin).or_insert(callback);
            }
        }
    }

    /// Current level of `pin`, if it was ever driven or claimed.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        lock(&self.state).levels.get(&pin).copied()
    }

    /// `true` while `pin` is claimed by a live [`MockPin`].
    pub fn is_claimed(&self, pin: u8) -> bool {
        lock(&self.state).claimed.contains(&pin)
    }

    /// `true` while an edge callback is registered on `pin`.
    pub fn interrupt_armed(&self, pin: u8) -> bool {
        lock(&self.state).armed.contains(&pin)
    }

    /// Number of edge registrations attempted on `pin`.
    pub fn edge_attempts(&self, pin: u8) -> u32 {
        lock(&self.state).edge_attempts.get(&pin).copied().unwrap_or(0)
    }

    /// Number of reads attempted on `pin`, failed ones included.
    pub fn reads(&self, pin: u8) -> u32 {
        lock(&self.state).reads.get(&pin).copied().unwrap_or(0)
    }
}

impl GpioBackend for MockGpio {
    type Pin = MockPin;
    type Error = MockGpioError;

    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<Self::Pin, Self::Error> {
        let mut state = lock(&self.state);
        if state.refuse_claims.contains(&pin) || !state.claimed.insert(pin) {
            return Err(MockGpioError::Busy(pin));
        }
        state.levels.entry(pin).or_insert(pull.idle_level());
        Ok(MockPin {
            number: pin,
            gpio: self.clone(),
        })
    }
}

/// Input pin claimed from a [`MockGpio`]. Dropping it frees the line.
pub struct MockPin {
    number: u8,
    gpio: MockGpio,
}

impl InputPin for MockPin {
    type Error = MockGpioError;

    fn number(&self) -> u8 {
        self.number
    }

    fn read(&self) -> Result<PinState, Self::Error> {
        let mut state = lock(&self.gpio.state);
        *state.reads.entry(self.number).or_insert(0) += 1;
        if let Some(remaining) = state.failing_reads.get_mut(&self.number) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(MockGpioError::Read(self.number));
            }
        }
        Ok(state
            .levels
            .get(&self.number)
            .copied()
            .unwrap_or(PinState::Low))
    }
}

impl InterruptPin for MockPin {
    /// Every mode is delivered as both edges; the manager only asks for
    /// [`InterruptMode::BothEdges`].
    fn enable_interrupt(
        &mut self,
        _mode: InterruptMode,
        callback: EdgeCallback,
    ) -> Result<(), Self::Error> {
        let mut state = lock(&self.gpio.state);
        *state.edge_attempts.entry(self.number).or_insert(0) += 1;
        if state.refuse_edges.contains(&self.number) {
            return Err(MockGpioError::EdgeUnavailable(self.number));
        }
        state.armed.insert(self.number);
        state.callbacks.insert(self.number, callback);
        Ok(())
    }

    fn disable_interrupt(&mut self) -> Result<(), Self::Error> {
        let mut state = lock(&self.gpio.state);
        state.armed.remove(&self.number);
        state.callbacks.remove(&self.number);
        Ok(())
    }
}

impl Drop for MockPin {
    fn drop(&mut self) {
        let mut state = lock(&self.gpio.state);
        state.claimed.remove(&self.number);
        state.armed.remove(&self.number);
        state.callbacks.remove(&self.number);
    }
}
