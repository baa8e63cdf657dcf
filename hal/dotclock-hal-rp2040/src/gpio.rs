//! Button inputs
//!
//! Buttons are wired active-low with the internal pull-up enabled, so a
//! press is a falling edge.

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;

/// A push button on a pulled-up GPIO
pub struct ButtonInput<'d> {
    input: Input<'d>,
}

impl<'d> ButtonInput<'d> {
    /// Configure `pin` as a pulled-up input
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }

    /// Release the underlying embassy input
    pub fn into_inner(self) -> Input<'d> {
        self.input
    }
}

impl<'d> dotclock_hal::EdgeInput for ButtonInput<'d> {
    async fn wait_for_falling_edge(&mut self) {
        self.input.wait_for_falling_edge().await;
    }

    fn is_low(&self) -> bool {
        self.input.is_low()
    }
}
