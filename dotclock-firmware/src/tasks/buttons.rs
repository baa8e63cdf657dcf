//! Button edge tasks
//!
//! One task instance per button. Each waits for a falling edge, runs the
//! shared debounce check and queues the press for the render loop.

use defmt::*;
use embassy_time::Instant;

use dotclock_core::input::Button;
use dotclock_hal_rp2040::gpio::ButtonInput;
use dotclock_hal_rp2040::EdgeInput;

use crate::channels::{BUTTONS, DEBOUNCER};

#[embassy_executor::task(pool_size = 5)]
pub async fn button_task(mut input: ButtonInput<'static>, button: Button) {
    debug!("Button task started: {:?}", button);

    loop {
        input.wait_for_falling_edge().await;

        // Wraps after ~49 days; the debouncer compares with wrapping math
        let now_ms = Instant::now().as_millis() as u32;
        if !DEBOUNCER.accept(button.index(), now_ms) {
            trace!("Bounce on {:?} ignored", button);
            continue;
        }

        if BUTTONS.try_send(button).is_err() {
            warn!("Button queue full, dropped {:?}", button);
        }
    }
}
