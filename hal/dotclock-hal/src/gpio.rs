//! GPIO pin abstractions
//!
//! The LED chain is bit-banged over three plain output lines, and the
//! buttons are edge-triggered inputs. Neither side has an error path:
//! a GPIO write cannot fail once the pin is configured.

use core::future::Future;

/// Digital output pin
///
/// Used for the data, clock and chip-select lines of the LED chain.
pub trait OutputPin {
    /// Drive the line high (logic 1)
    fn set_high(&mut self);

    /// Drive the line low (logic 0)
    fn set_low(&mut self);

    /// Drive the line to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the line is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the line is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Edge-triggered digital input
///
/// Buttons are wired active-low with pull-ups, so a press is a falling edge.
/// Implementations must only wake the waiting task; debouncing is done by
/// the caller against its own timestamps.
pub trait EdgeInput {
    /// Wait until the next falling edge on the line
    fn wait_for_falling_edge(&mut self) -> impl Future<Output = ()>;

    /// Check if the line currently reads low (button held)
    fn is_low(&self) -> bool;
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}
