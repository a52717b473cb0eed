//! Per-button watch state.

use serde::Serialize;

/// How a button's pin is being watched.
///
/// ```text
/// Unwatched ──edge registered──► EdgeWatching
///     │                               │ (never goes back)
///     └──registration refused──► PollWatching
/// ```
///
/// Disabled buttons stay `Unwatched` for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    /// No pin claimed
    Unwatched,
    /// Both-edge callback registered
    EdgeWatching,
    /// Sampled on the poll tick
    PollWatching,
}

impl WatchState {
    /// `true` for both watching states.
    pub fn is_watching(self) -> bool {
        !matches!(self, Self::Unwatched)
    }

    /// Outcome of an edge registration attempt on an enabled pin.
    pub(crate) fn after_registration(registered: bool) -> Self {
        if registered {
            Self::EdgeWatching
        } else {
            Self::PollWatching
        }
    }
}

impl core::fmt::Display for WatchState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Unwatched => "unwatched",
            Self::EdgeWatching => "edge",
            Self::PollWatching => "poll",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_outcome() {
        assert_eq!(WatchState::after_registration(true), WatchState::EdgeWatching);
        assert_eq!(WatchState::after_registration(false), WatchState::PollWatching);
        assert!(!WatchState::Unwatched.is_watching());
        assert!(WatchState::PollWatching.is_watching());
    }
}
