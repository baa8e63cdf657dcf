//! Board-agnostic core logic for the LED matrix clock
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - LED matrix trait the canvas flushes into
//! - Interval timers and interrupt-safe button debouncing
//! - UI state machine (clock/spectrum views, time setting)
//! - Wall clock on top of a monotonic millisecond counter
//! - Spectrum math (FFT amplitudes, bar heights, peak decay)
//! - Configuration and persisted settings types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod input;
pub mod spectrum;
pub mod state;
pub mod timing;
pub mod traits;
