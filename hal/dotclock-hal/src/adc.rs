//! Block-based analog sampling
//!
//! The spectrum view needs evenly spaced samples, so sampling is exposed as
//! "fill this block" rather than single conversions. On the RP2040 this is a
//! free-running ADC drained by DMA.

use core::future::Future;

/// Errors from a sample acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleError {
    /// Converter or DMA channel still in use; retry later
    Busy,
    /// The conversion reported an error (FIFO overrun, bad sample)
    Conversion,
    /// The sampler could not be set up; not recoverable
    Init,
}

impl SampleError {
    /// Whether retrying the read can succeed
    pub fn is_transient(self) -> bool {
        matches!(self, SampleError::Busy)
    }
}

/// Source of fixed-rate 16-bit samples
pub trait SampleSource {
    /// Fill `buffer` with consecutive samples
    ///
    /// Returns the number of samples written, which may be less than
    /// `buffer.len()`. Samples past the returned count are left untouched.
    fn read(&mut self, buffer: &mut [u16]) -> impl Future<Output = Result<usize, SampleError>>;

    /// Sampling frequency in Hz
    fn sample_rate(&self) -> u32;
}
