//! Cooperative timing primitives
//!
//! Everything here works on plain millisecond counts so it can be driven by
//! `embassy_time::Instant` on target and by literals in tests.

pub mod debounce;
pub mod interval;

pub use debounce::{Debouncer, DEFAULT_GUARD_MS};
pub use interval::{Blinker, IntervalTimer};
