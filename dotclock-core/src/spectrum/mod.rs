//! Spectrum analysis for the bar display
//!
//! Raw ADC blocks go through a real FFT into single-sided amplitudes;
//! amplitudes become bar heights, and each bar carries a slowly falling peak.

pub mod bars;
pub mod fft;

pub use bars::{bar_height, Bars, MAX_BARS};
pub use fft::{Analyzer, SampleSize};
