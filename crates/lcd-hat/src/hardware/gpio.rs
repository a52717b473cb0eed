//! `rppal` GPIO backend for button inputs.

use platform::{EdgeCallback, GpioBackend, InputPin, InterruptMode, InterruptPin, PinState, Pull};
use rppal::gpio::{Event, Gpio, Level, Trigger};
use tracing::debug;

use crate::error::InputError;

/// The Pi's GPIO controller.
pub struct RppalGpio {
    gpio: Gpio,
}

impl RppalGpio {
    /// Open `/dev/gpiomem`.
    pub fn open() -> Result<Self, InputError> {
        let gpio = Gpio::new().map_err(|e| InputError::Controller(Box::new(e)))?;
        Ok(Self { gpio })
    }
}

impl GpioBackend for RppalGpio {
    type Pin = RppalInputPin;
    type Error = rppal::gpio::Error;

    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<Self::Pin, Self::Error> {
        let raw = self.gpio.get(pin)?;
        let input = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::Floating => raw.into_input(),
        };
        debug!(pin, "claimed input");
        Ok(RppalInputPin(input))
    }
}

/// Claimed input line. Dropping it clears any interrupt and frees the pin.
pub struct RppalInputPin(rppal::gpio::InputPin);

fn to_state(level: Level) -> PinState {
    match level {
        Level::High => PinState::High,
        Level::Low => PinState::Low,
    }
}

impl InputPin for RppalInputPin {
    type Error = rppal::gpio::Error;

    fn number(&self) -> u8 {
        self.0.pin()
    }

    fn read(&self) -> Result<PinState, Self::Error> {
        Ok(to_state(self.0.read()))
    }
}

impl InterruptPin for RppalInputPin {
    fn enable_interrupt(
        &mut self,
        mode: InterruptMode,
        mut callback: EdgeCallback,
    ) -> Result<(), Self::Error> {
        let trigger = match mode {
            InterruptMode::RisingEdge => Trigger::RisingEdge,
            InterruptMode::FallingEdge => Trigger::FallingEdge,
            InterruptMode::BothEdges => Trigger::Both,
        };
        // rppal runs the closure on its own interrupt thread.
        self.0
            .set_async_interrupt(trigger, None, move |event: Event| match event.trigger {
                Trigger::RisingEdge => callback(PinState::High),
                Trigger::FallingEdge => callback(PinState::Low),
                _ => {}
            })
    }

    fn disable_interrupt(&mut self) -> Result<(), Self::Error> {
        self.0.clear_async_interrupt()
    }
}
