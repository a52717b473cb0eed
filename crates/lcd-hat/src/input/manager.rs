//! Input session: claims pins, picks a watch per button and runs the
//! debounce loop.

use std::future::Future;
use std::time::Duration;

use platform::{
    Button, EdgeCallback, GpioBackend, InputEvent, InputPin, InterruptMode, InterruptPin, PinState,
    Transition,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::sink::{self, EventSink, InputEvents};
use super::state::WatchState;
use super::ButtonSpec;
use crate::config::MIN_POLL_INTERVAL;
use crate::error::{EdgeRegistrationError, InputError, PinReadError};

/// Level reported by an edge callback, stamped on the callback's thread.
#[derive(Debug, Clone, Copy)]
struct EdgeReport {
    index: usize,
    level: PinState,
    at: Instant,
}

struct ButtonState<P> {
    spec: ButtonSpec,
    pin: Option<P>,
    watch: WatchState,
    debouncer: Debouncer,
    read_failing: bool,
}

impl<P: InputPin> ButtonState<P> {
    fn accept(&mut self, now: Instant) -> Option<InputEvent> {
        let (level, at) = self.debouncer.settle(now)?;
        let transition = Transition::into_state(self.spec.polarity.is_active(level));
        debug!(button = %self.spec.button, %level, %transition, "debounced");
        Some(InputEvent {
            button: self.spec.button,
            transition,
            at,
        })
    }

    fn sample(&mut self, now: Instant) -> Option<InputEvent> {
        let pin = self.pin.as_ref()?;
        match pin.read() {
            Ok(level) => {
                if self.read_failing {
                    debug!(button = %self.spec.button, "pin reads recovered");
                    self.read_failing = false;
                }
                self.debouncer.observe(level, now);
                self.accept(now)
            }
            Err(source) => {
                if !self.read_failing {
                    let error = PinReadError {
                        button: self.spec.button,
                        pin: pin.number(),
                        source: Box::new(source),
                    };
                    warn!(%error, cause = %error.source, "retrying on next tick");
                    self.read_failing = true;
                }
                None
            }
        }
    }
}

enum Wake {
    Shutdown,
    Edge(EdgeReport),
    Tick,
    Deadline,
}

/// A running set of watched buttons.
///
/// Dropping the session releases every edge registration and pin.
pub struct InputSession<P: InterruptPin> {
    buttons: Vec<ButtonState<P>>,
    edges_rx: mpsc::UnboundedReceiver<EdgeReport>,
    poll_interval: Duration,
}

impl<P: InterruptPin> InputSession<P> {
    /// Claim and watch every enabled button in `specs`.
    ///
    /// Edge detection is tried first; a refused registration switches that
    /// button to polling for the rest of the session. Disabled buttons are
    /// never claimed. The poll tick defaults to the longest debounce window
    /// with a 20 ms floor.
    pub fn start<G>(gpio: &mut G, specs: &[ButtonSpec]) -> Result<Self, InputError>
    where
        G: GpioBackend<Pin = P>,
    {
        let mut seen: Vec<Button> = Vec::with_capacity(specs.len());
        for spec in specs {
            if seen.contains(&spec.button) {
                return Err(InputError::DuplicateButton(spec.button));
            }
            seen.push(spec.button);
        }

        let (edges_tx, edges_rx) = mpsc::unbounded_channel();
        let mut buttons = Vec::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            let Some(number) = spec.pin.gpio() else {
                debug!(button = %spec.button, "disabled, not watching");
                buttons.push(ButtonState {
                    spec: *spec,
                    pin: None,
                    watch: WatchState::Unwatched,
                    debouncer: Debouncer::new(spec.polarity.idle_level(), spec.debounce),
                    read_failing: false,
                });
                continue;
            };

            let mut pin = gpio
                .claim_input(number, spec.polarity.pull())
                .map_err(|source| InputError::Claim {
                    button: spec.button,
                    pin: number,
                    source: Box::new(source),
                })?;

            let initial = match pin.read() {
                Ok(level) => level,
                Err(error) => {
                    warn!(button = %spec.button, pin = number, %error, "initial read failed, assuming released");
                    spec.polarity.idle_level()
                }
            };
            if spec.polarity.is_active(initial) {
                info!(button = %spec.button, "held at start-up; only its release will be reported");
            }

            let tx = edges_tx.clone();
            let callback: EdgeCallback = Box::new(move |level| {
                // Fails only once the session is gone.
                let _ = tx.send(EdgeReport {
                    index,
                    level,
                    at: Instant::now(),
                });
            });
            let registered = match pin.enable_interrupt(InterruptMode::BothEdges, callback) {
                Ok(()) => true,
                Err(source) => {
                    let error = EdgeRegistrationError {
                        button: spec.button,
                        pin: number,
                        source: Box::new(source),
                    };
                    warn!(%error, cause = %error.source, "falling back to polling");
                    false
                }
            };
            let watch = WatchState::after_registration(registered);
            debug!(button = %spec.button, pin = number, %watch, "watching");

            buttons.push(ButtonState {
                spec: *spec,
                pin: Some(pin),
                watch,
                debouncer: Debouncer::new(initial, spec.debounce),
                read_failing: false,
            });
        }

        let poll_interval = specs
            .iter()
            .map(|s| s.debounce)
            .max()
            .unwrap_or_default()
            .max(MIN_POLL_INTERVAL);

        let session = Self {
            buttons,
            edges_rx,
            poll_interval,
        };
        info!(
            edge = session.count(WatchState::EdgeWatching),
            poll = session.count(WatchState::PollWatching),
            disabled = session.count(WatchState::Unwatched),
            "input session started"
        );
        Ok(session)
    }

    /// Use `poll_interval` for the poll tick instead of the derived one.
    /// Zero is raised to 1 ms.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Poll tick period.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Watch state of `button`, if it is part of the session.
    pub fn watch_state(&self, button: Button) -> Option<WatchState> {
        self.buttons
            .iter()
            .find(|b| b.spec.button == button)
            .map(|b| b.watch)
    }

    /// Last debounced level of `button`.
    pub fn stable_level(&self, button: Button) -> Option<PinState> {
        self.buttons
            .iter()
            .find(|b| b.spec.button == button && b.watch.is_watching())
            .map(|b| b.debouncer.stable())
    }

    fn count(&self, watch: WatchState) -> usize {
        self.buttons.iter().filter(|b| b.watch == watch).count()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.buttons
            .iter()
            .filter(|b| b.watch == WatchState::EdgeWatching)
            .filter_map(|b| b.debouncer.deadline())
            .min()
    }

    /// Drive the loop until `shutdown` resolves, handing events to `sink`.
    pub async fn run<S, F>(&mut self, sink: &mut S, shutdown: F)
    where
        S: EventSink,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let polling = self.count(WatchState::PollWatching) > 0;
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let deadline = self.next_deadline();
            let wake = tokio::select! {
                biased;
                () = &mut shutdown => Wake::Shutdown,
                Some(report) = self.edges_rx.recv() => Wake::Edge(report),
                _ = ticker.tick(), if polling => Wake::Tick,
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Deadline,
            };

            match wake {
                Wake::Shutdown => break,
                Wake::Edge(report) => self.on_edge(report),
                Wake::Tick => {
                    let now = Instant::now();
                    for button in &mut self.buttons {
                        if button.watch != WatchState::PollWatching {
                            continue;
                        }
                        if let Some(event) = button.sample(now) {
                            sink.emit(event);
                        }
                    }
                }
                Wake::Deadline => {
                    let now = Instant::now();
                    for button in &mut self.buttons {
                        if button.watch != WatchState::EdgeWatching {
                            continue;
                        }
                        if let Some(event) = button.accept(now) {
                            sink.emit(event);
                        }
                    }
                }
            }
        }
        info!("input session stopped");
    }

    fn on_edge(&mut self, report: EdgeReport) {
        let Some(button) = self.buttons.get_mut(report.index) else {
            return;
        };
        if button.watch == WatchState::EdgeWatching {
            button.debouncer.observe(report.level, report.at);
        }
    }

    /// Run on a tokio task, delivering events through a bounded channel.
    ///
    /// The receiver yields `None` once `shutdown` resolves and the session
    /// has been dropped.
    pub fn spawn<F>(mut self, shutdown: F) -> (InputEvents, JoinHandle<()>)
    where
        P: Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let (mut sink, events) = sink::channel();
        let handle = tokio::spawn(async move {
            self.run(&mut sink, shutdown).await;
        });
        (events, handle)
    }
}

impl<P: InterruptPin> Drop for InputSession<P> {
    fn drop(&mut self) {
        for button in &mut self.buttons {
            if button.watch != WatchState::EdgeWatching {
                continue;
            }
            if let Some(pin) = button.pin.as_mut() {
                if let Err(error) = pin.disable_interrupt() {
                    debug!(button = %button.spec.button, %error, "edge release failed");
                }
            }
        }
    }
}
