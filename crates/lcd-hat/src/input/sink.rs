//! Event sinks and the consumer-side receiver.
//!
//! The session hands every accepted transition to an [`EventSink`] by value.
//! [`ChannelSink`] never blocks the input loop: if the consumer stalls and
//! [`CHANNEL_DEPTH`] events are queued, further events are dropped and
//! counted.

use platform::{InputDevice, InputEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Depth of the event channel returned by [`channel`].
pub const CHANNEL_DEPTH: usize = 16;

/// Receives debounced events.
pub trait EventSink {
    /// Take one event.
    fn emit(&mut self, event: InputEvent);
}

impl EventSink for Vec<InputEvent> {
    fn emit(&mut self, event: InputEvent) {
        self.push(event);
    }
}

/// Calls a closure for every event.
///
/// ```
/// use lcd_hat::input::{EventSink, FnSink};
/// use platform::{Button, InputEvent};
///
/// let mut count = 0;
/// let mut sink = FnSink(|_: InputEvent| count += 1);
/// sink.emit(InputEvent::pressed(Button::A, tokio::time::Instant::now()));
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(InputEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: InputEvent) {
        (self.0)(event);
    }
}

/// Logs each event as `[+S.mmm s] BTN_UP pressed`, relative to creation.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    origin: Instant,
}

impl LogSink {
    /// Sink whose clock starts now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Render `event` the way [`emit`](EventSink::emit) logs it.
    pub fn format(&self, event: &InputEvent) -> String {
        let elapsed = event.at.saturating_duration_since(self.origin);
        format!(
            "[+{:.3} s] {} {}",
            elapsed.as_secs_f64(),
            event.button.key(),
            event.transition
        )
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: InputEvent) {
        info!("{}", self.format(&event));
    }
}

/// Non-blocking sender half of [`channel`].
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<InputEvent>,
    dropped: u64,
}

impl ChannelSink {
    /// Events dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: InputEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped += 1;
                warn!(
                    button = %event.button,
                    transition = %event.transition,
                    dropped = self.dropped,
                    "event queue full, dropping event"
                );
            }
            Err(TrySendError::Closed(_)) => debug!("event consumer gone"),
        }
    }
}

/// Consumer half of [`channel`]; yields `None` once the session ends.
#[derive(Debug)]
pub struct InputEvents {
    rx: mpsc::Receiver<InputEvent>,
}

impl InputDevice for InputEvents {
    async fn wait_for_event(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        self.rx.try_recv().ok() // Empty and Disconnected both mean "nothing now"
    }
}

/// Bounded event channel of [`CHANNEL_DEPTH`].
pub fn channel() -> (ChannelSink, InputEvents) {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    (ChannelSink { tx, dropped: 0 }, InputEvents { rx })
}
