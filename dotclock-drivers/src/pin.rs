//! embedded-hal pin adapter
//!
//! Lets any `embedded_hal::digital::OutputPin` drive the LED bus. The level
//! is tracked locally because the bus only needs to know what it last wrote.

use dotclock_hal::OutputPin;

/// Wraps an embedded-hal output pin
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: embedded_hal::digital::OutputPin> EhOutput<P> {
    /// Wrap a pin, driving it low
    pub fn new(mut pin: P) -> Self {
        // GPIO writes on supported chips are infallible
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    /// Unwrap the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
