//! FFT amplitudes
//!
//! `microfft` only offers fixed-size transforms, so the block size is an
//! enum and each variant dispatches to its own transform.

use microfft::Complex32;

use crate::config::MAX_SAMPLES;

/// Supported FFT block sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleSize {
    S16,
    S32,
    S64,
    S128,
    S256,
    S512,
}

impl SampleSize {
    /// Block size for a sample count, if supported
    pub const fn from_len(len: u16) -> Option<Self> {
        match len {
            16 => Some(SampleSize::S16),
            32 => Some(SampleSize::S32),
            64 => Some(SampleSize::S64),
            128 => Some(SampleSize::S128),
            256 => Some(SampleSize::S256),
            512 => Some(SampleSize::S512),
            _ => None,
        }
    }

    /// Samples per block
    pub const fn len(self) -> usize {
        match self {
            SampleSize::S16 => 16,
            SampleSize::S32 => 32,
            SampleSize::S64 => 64,
            SampleSize::S128 => 128,
            SampleSize::S256 => 256,
            SampleSize::S512 => 512,
        }
    }

    /// Number of single-sided bins
    pub const fn bins(self) -> usize {
        self.len() / 2
    }
}

/// Reusable FFT working storage
///
/// Sized for the largest block; only the first `size.len()` entries are used.
pub struct Analyzer {
    size: SampleSize,
    work: [f32; MAX_SAMPLES],
    amplitudes: [f32; MAX_SAMPLES / 2],
}

macro_rules! transform {
    ($work:expr, $fft:path, $n:literal) => {{
        let block: &mut [f32; $n] = match (&mut $work[..$n]).try_into() {
            Ok(block) => block,
            Err(_) => return &[],
        };
        let spectrum: &mut [Complex32] = $fft(block);
        spectrum
    }};
}

impl Analyzer {
    pub const fn new(size: SampleSize) -> Self {
        Self {
            size,
            work: [0.0; MAX_SAMPLES],
            amplitudes: [0.0; MAX_SAMPLES / 2],
        }
    }

    pub const fn size(&self) -> SampleSize {
        self.size
    }

    /// Amplitudes of the last processed block
    pub fn amplitudes(&self) -> &[f32] {
        &self.amplitudes[..self.size.bins()]
    }

    /// Transform one block of samples into single-sided amplitudes
    ///
    /// Bin `k > 0` is `|X_k| * 2 / n`, bin 0 is `|X_0| / n`. Missing samples
    /// (short `samples`) count as zero.
    pub fn process(&mut self, samples: &[u16]) -> &[f32] {
        let n = self.size.len();
        for (i, slot) in self.work[..n].iter_mut().enumerate() {
            *slot = samples.get(i).copied().unwrap_or(0) as f32;
        }

        let spectrum = match self.size {
            SampleSize::S16 => transform!(self.work, microfft::real::rfft_16, 16),
            SampleSize::S32 => transform!(self.work, microfft::real::rfft_32, 32),
            SampleSize::S64 => transform!(self.work, microfft::real::rfft_64, 64),
            SampleSize::S128 => transform!(self.work, microfft::real::rfft_128, 128),
            SampleSize::S256 => transform!(self.work, microfft::real::rfft_256, 256),
            SampleSize::S512 => transform!(self.work, microfft::real::rfft_512, 512),
        };

        let scale = n as f32;
        for (k, (amp, bin)) in self.amplitudes.iter_mut().zip(spectrum.iter()).enumerate() {
            *amp = if k == 0 {
                // rfft packs the Nyquist bin into X_0's imaginary part
                libm::fabsf(bin.re) / scale
            } else {
                libm::sqrtf(bin.re * bin.re + bin.im * bin.im) * 2.0 / scale
            };
        }

        &self.amplitudes[..self.size.bins()]
    }
}
