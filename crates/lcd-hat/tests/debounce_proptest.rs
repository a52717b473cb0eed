//! Property tests for the debouncer.
//!
//! Run with: cargo test -p lcd-hat --test debounce_proptest

use std::time::Duration;

use lcd_hat::input::Debouncer;
use platform::PinState;
use proptest::prelude::*;
use tokio::time::Instant;

const WINDOW_MS: u64 = 50;

fn flip(level: PinState) -> PinState {
    match level {
        PinState::High => PinState::Low,
        PinState::Low => PinState::High,
    }
}

/// Feed alternating levels separated by `gaps`, settling before each change
/// the way the input loop would. Returns the debouncer, every accepted
/// change, and the time of the last raw change.
fn bounce(gaps: &[u64]) -> (Debouncer, Vec<(PinState, Instant)>, Instant) {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(PinState::High, Duration::from_millis(WINDOW_MS));
    let mut accepted = Vec::new();
    let mut level = PinState::High;
    let mut now = start;

    for gap in gaps {
        now += Duration::from_millis(*gap);
        accepted.extend(debouncer.settle(now));
        level = flip(level);
        debouncer.observe(level, now);
    }
    (debouncer, accepted, now)
}

proptest! {
    /// Bounces that return to the stable level never produce an event.
    #[test]
    fn sub_window_bounce_is_ignored(
        pairs in prop::collection::vec((1u64..WINDOW_MS, 1u64..WINDOW_MS), 0..20),
    ) {
        let gaps: Vec<u64> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        let (mut debouncer, accepted, last) = bounce(&gaps);

        prop_assert!(accepted.is_empty());
        prop_assert_eq!(debouncer.settle(last + Duration::from_secs(10)), None);
        prop_assert_eq!(debouncer.stable(), PinState::High);
    }

    /// A change that finally holds produces exactly one event, stamped one
    /// window after the last raw change.
    #[test]
    fn persisted_change_is_accepted_once(
        pairs in prop::collection::vec((1u64..WINDOW_MS, 1u64..WINDOW_MS), 0..20),
        last_gap in 1u64..WINDOW_MS,
        late_ms in 0u64..500,
    ) {
        let mut gaps: Vec<u64> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        gaps.push(last_gap);
        let (mut debouncer, accepted, last) = bounce(&gaps);
        prop_assert!(accepted.is_empty());

        let deadline = last + Duration::from_millis(WINDOW_MS);
        prop_assert_eq!(debouncer.deadline(), Some(deadline));

        let settled = debouncer.settle(deadline + Duration::from_millis(late_ms));
        prop_assert_eq!(settled, Some((PinState::Low, deadline)));
        prop_assert_eq!(debouncer.settle(deadline + Duration::from_secs(10)), None);
        prop_assert_eq!(debouncer.stable(), PinState::Low);
    }
}
