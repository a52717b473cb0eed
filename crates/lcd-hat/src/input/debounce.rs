//! Time-window debouncer shared by edge and poll watching.

use platform::PinState;
use tokio::time::{Duration, Instant};

/// Tracks one pin's stable level and at most one candidate level.
///
/// A raw change away from the stable level starts a candidate; going back
/// discards it. The candidate is accepted once it has held for the whole
/// window, and the accepted change is stamped `last_raw_change + window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    stable: PinState,
    pending: Option<(PinState, Instant)>,
}

impl Debouncer {
    /// Debouncer whose stable level starts at `initial`.
    pub fn new(initial: PinState, window: Duration) -> Self {
        Self {
            window,
            stable: initial,
            pending: None,
        }
    }

    /// Last accepted level.
    pub fn stable(&self) -> PinState {
        self.stable
    }

    /// Debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a raw level seen at `at`.
    ///
    /// Repeating the candidate level (a poll sample, a duplicate edge) keeps
    /// the original start time.
    pub fn observe(&mut self, level: PinState, at: Instant) {
        if level == self.stable {
            self.pending = None;
            return;
        }
        match self.pending {
            Some((candidate, _)) if candidate == level => {}
            _ => self.pending = Some((level, at)),
        }
    }

    /// When the current candidate would be accepted.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, since)| since + self.window)
    }

    /// Accept the candidate if it has held for the window by `now`.
    ///
    /// Returns the new stable level and its timestamp.
    pub fn settle(&mut self, now: Instant) -> Option<(PinState, Instant)> {
        let (level, _) = self.pending?;
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.stable = level;
        self.pending = None;
        Some((level, deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(50);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn bounce_restarts_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(PinState::High, WINDOW);

        d.observe(PinState::Low, t0);
        d.observe(PinState::High, t0 + ms(10));
        assert_eq!(d.deadline(), None);
        d.observe(PinState::Low, t0 + ms(40));

        assert_eq!(d.settle(t0 + ms(89)), None);
        assert_eq!(d.settle(t0 + ms(90)), Some((PinState::Low, t0 + ms(90))));
        assert_eq!(d.stable(), PinState::Low);
        assert_eq!(d.settle(t0 + ms(200)), None, "accepted once");
    }

    #[test]
    fn repeated_samples_keep_start_time() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(PinState::Low, WINDOW);
        d.observe(PinState::High, t0);
        d.observe(PinState::High, t0 + ms(20));
        d.observe(PinState::High, t0 + ms(40));
        assert_eq!(d.deadline(), Some(t0 + WINDOW));
    }

    #[test]
    fn late_settle_stamps_deadline_not_now() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(PinState::High, WINDOW);
        d.observe(PinState::Low, t0);
        assert_eq!(d.settle(t0 + ms(500)), Some((PinState::Low, t0 + WINDOW)));
    }

    #[test]
    fn zero_window_accepts_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(PinState::High, Duration::ZERO);
        d.observe(PinState::Low, t0);
        assert_eq!(d.settle(t0), Some((PinState::Low, t0)));
    }
}
