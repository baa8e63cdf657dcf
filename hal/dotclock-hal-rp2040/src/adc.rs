//! ADC block sampler
//!
//! RP2040 has a single 12-bit ADC clocked at 48MHz with 4 external inputs:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29
//!
//! The sampler runs the converter free-running at a fixed rate and drains
//! the FIFO with DMA, so a whole FFT block is captured per read.

use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::dma;
use embassy_rp::Peri;

use dotclock_hal::{SampleError, SampleSource};

/// ADC clock frequency
pub const ADC_CLOCK_HZ: u32 = 48_000_000;

/// One conversion takes 96 ADC clocks, which caps the rate at 500kS/s
pub const MIN_CONVERSION_CYCLES: u32 = 96;

/// Highest supported sampling rate
pub const MAX_SAMPLE_RATE_HZ: u32 = ADC_CLOCK_HZ / MIN_CONVERSION_CYCLES;

/// ADC input identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcInput {
    /// ADC0 on GPIO26
    Adc0,
    /// ADC1 on GPIO27
    Adc1,
    /// ADC2 on GPIO28
    Adc2,
    /// ADC3 on GPIO29
    Adc3,
}

impl AdcInput {
    /// Get the GPIO pin for this input
    pub fn gpio(&self) -> u8 {
        match self {
            AdcInput::Adc0 => 26,
            AdcInput::Adc1 => 27,
            AdcInput::Adc2 => 28,
            AdcInput::Adc3 => 29,
        }
    }

    /// Get the ADC input wired to a GPIO pin
    pub fn from_gpio(gpio: u8) -> Option<Self> {
        match gpio {
            26 => Some(AdcInput::Adc0),
            27 => Some(AdcInput::Adc1),
            28 => Some(AdcInput::Adc2),
            29 => Some(AdcInput::Adc3),
            _ => None,
        }
    }
}

/// Calculate the free-running clock divider for a sampling rate
///
/// The ADC starts a conversion every `div + 1` clocks. Rates above
/// [`MAX_SAMPLE_RATE_HZ`] are clamped to back-to-back conversions, and a
/// rate of zero is rejected.
pub fn clock_divider(sample_rate_hz: u32) -> Option<u16> {
    if sample_rate_hz == 0 {
        return None;
    }
    let cycles = (ADC_CLOCK_HZ / sample_rate_hz).max(MIN_CONVERSION_CYCLES);
    u16::try_from(cycles - 1).ok()
}

/// DMA-driven sampler on one ADC input
pub struct AdcSampler<'d, D: dma::Channel> {
    adc: Adc<'d, Async>,
    channel: Channel<'d>,
    dma: Peri<'d, D>,
    div: u16,
    sample_rate_hz: u32,
}

impl<'d, D: dma::Channel> AdcSampler<'d, D> {
    /// Create a sampler for `channel` at `sample_rate_hz`
    ///
    /// Fails with [`SampleError::Init`] if the rate cannot be expressed as
    /// an ADC clock divider.
    pub fn new(
        adc: Adc<'d, Async>,
        channel: Channel<'d>,
        dma: Peri<'d, D>,
        sample_rate_hz: u32,
    ) -> Result<Self, SampleError> {
        let div = clock_divider(sample_rate_hz).ok_or(SampleError::Init)?;
        Ok(Self {
            adc,
            channel,
            dma,
            div,
            sample_rate_hz: ADC_CLOCK_HZ / (div as u32 + 1),
        })
    }

    /// Clock divider programmed for each block
    pub fn divider(&self) -> u16 {
        self.div
    }
}

impl<'d, D: dma::Channel> SampleSource for AdcSampler<'d, D> {
    async fn read(&mut self, buffer: &mut [u16]) -> Result<usize, SampleError> {
        if buffer.is_empty() {
            return Ok(0);
        }

        self.adc
            .read_many(&mut self.channel, buffer, self.div, self.dma.reborrow())
            .await
            .map_err(|_| SampleError::Conversion)?;

        // Samples carry an error flag in bit 15; keep the 12-bit value
        for sample in buffer.iter_mut() {
            *sample &= 0x0FFF;
        }

        Ok(buffer.len())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate_hz
    }
}
