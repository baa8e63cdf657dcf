//! Civil time on top of the monotonic tick counter

pub mod wall_clock;

pub use wall_clock::{ClockError, WallClock};
