//! Display configuration
//!
//! Describes the LED chain, the canvas laid over it, the audio sampler and
//! the animation pacing. Defaults come from the firmware's `display.toml`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum devices in one chain
pub const MAX_DEVICES: usize = 16;

/// Side length of one device cell in pixels
pub const CELL_SIZE: u16 = 8;

/// Maximum canvas bitmap size in bytes (one bit per pixel)
pub const MAX_CANVAS_BYTES: usize = 128;

/// Supported FFT block sizes
pub const SAMPLE_SIZES: [u16; 6] = [16, 32, 64, 128, 256, 512];

/// Largest supported FFT block
pub const MAX_SAMPLES: usize = 512;

/// Maximum spectrum gain
pub const MAX_GAIN: u8 = 100;

/// Maximum intensity level of the driver chips
pub const MAX_INTENSITY: u8 = 15;

/// How device cells are laid out under the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tiling {
    /// Cells fill rows left to right, top row first
    #[default]
    Horizontal,
    /// Cells fill columns top to bottom, left column first
    Vertical,
    /// As `Vertical`, with each cell mounted upside down
    VerticalFlip,
}

impl Tiling {
    /// Name used in `display.toml` and in persisted settings
    pub const fn name(self) -> &'static str {
        match self {
            Tiling::Horizontal => "horizontal",
            Tiling::Vertical => "vertical",
            Tiling::VerticalFlip => "vertical-flip",
        }
    }

    /// Next wiring in button order
    pub const fn next(self) -> Self {
        match self {
            Tiling::Horizontal => Tiling::Vertical,
            Tiling::Vertical => Tiling::VerticalFlip,
            Tiling::VerticalFlip => Tiling::Horizontal,
        }
    }

    /// Parse a tiling name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "horizontal" => Some(Tiling::Horizontal),
            "vertical" => Some(Tiling::Vertical),
            "vertical-flip" => Some(Tiling::VerticalFlip),
            _ => None,
        }
    }
}

/// Animation and input pacing, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Intervals {
    /// Clock colon blink
    pub colon_blink_ms: u32,
    /// Edited field blink while setting the time
    pub setting_blink_ms: u32,
    /// Re-roll of the dither bars in the seconds view
    pub dither_ms: u32,
    /// Spectrum peak decay step
    pub decay_ms: u32,
    /// Minimum time between two accepted edges of one button
    pub debounce_ms: u32,
    /// Render loop sleep
    pub loop_slice_ms: u32,
    /// Duration of one loading screen frame
    pub loading_frame_ms: u32,
}

impl Intervals {
    /// Stock pacing
    pub const DEFAULT: Self = Self {
        colon_blink_ms: 500,
        setting_blink_ms: 300,
        dither_ms: 300,
        decay_ms: 50,
        debounce_ms: 100,
        loop_slice_ms: 10,
        loading_frame_ms: 64,
    };

    fn all(&self) -> [u32; 7] {
        [
            self.colon_blink_ms,
            self.setting_blink_ms,
            self.dither_ms,
            self.decay_ms,
            self.debounce_ms,
            self.loop_slice_ms,
            self.loading_frame_ms,
        ]
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Number of chained devices (1..=16)
    pub chain_length: u8,
    /// Canvas width in pixels (multiple of 8)
    pub width: u16,
    /// Canvas height in pixels (multiple of 8)
    pub height: u16,
    /// Cell layout under the canvas
    pub tiling: Tiling,
    /// FFT block size, one of [`SAMPLE_SIZES`]
    pub sample_size: u16,
    /// Audio sampling rate in Hz
    pub sample_rate_hz: u32,
    /// Spectrum gain used until one is persisted (0..=100)
    pub default_gain: u8,
    /// Initial LED intensity (0..=15)
    pub intensity: u8,
    /// Local time offset from UTC in minutes
    pub utc_offset_minutes: i16,
    /// Animation pacing
    pub intervals: Intervals,
}

impl DisplayConfig {
    /// 32x16 panel of eight cells sampling audio at 50 kHz
    pub const DEFAULT: Self = Self {
        chain_length: 8,
        width: 32,
        height: 16,
        tiling: Tiling::Horizontal,
        sample_size: 128,
        sample_rate_hz: 50_000,
        default_gain: 20,
        intensity: 1,
        utc_offset_minutes: 480,
        intervals: Intervals::DEFAULT,
    };

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_length == 0 || self.chain_length as usize > MAX_DEVICES {
            return Err(ConfigError::InvalidChainLength);
        }
        if self.width == 0
            || self.height == 0
            || self.width % CELL_SIZE != 0
            || self.height % CELL_SIZE != 0
        {
            return Err(ConfigError::CanvasNotAligned);
        }
        if self.buffer_len() > MAX_CANVAS_BYTES {
            return Err(ConfigError::CanvasTooLarge);
        }
        if !SAMPLE_SIZES.contains(&self.sample_size) {
            return Err(ConfigError::InvalidSampleSize);
        }
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        if self.default_gain > MAX_GAIN {
            return Err(ConfigError::GainOutOfRange);
        }
        if self.intensity > MAX_INTENSITY {
            return Err(ConfigError::IntensityOutOfRange);
        }
        if self.intervals.all().contains(&0) {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Bytes per canvas row
    pub const fn bytes_per_row(&self) -> usize {
        (self.width / CELL_SIZE) as usize
    }

    /// Canvas bitmap size in bytes
    pub const fn buffer_len(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Index of the bottom canvas row
    pub const fn max_row(&self) -> u8 {
        let bottom = self.height.saturating_sub(1);
        if bottom > u8::MAX as u16 {
            u8::MAX
        } else {
            bottom as u8
        }
    }

    /// Number of cells the canvas covers
    pub const fn cells(&self) -> usize {
        (self.width / CELL_SIZE) as usize * (self.height / CELL_SIZE) as usize
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Display configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Chain length outside 1..=MAX_DEVICES
    InvalidChainLength,
    /// Canvas dimensions zero or not a multiple of the cell size
    CanvasNotAligned,
    /// Canvas bitmap exceeds MAX_CANVAS_BYTES
    CanvasTooLarge,
    /// Sample block size not a supported FFT size
    InvalidSampleSize,
    /// Sample rate is zero
    InvalidSampleRate,
    /// Gain above MAX_GAIN
    GainOutOfRange,
    /// Intensity above MAX_INTENSITY
    IntensityOutOfRange,
    /// An animation interval is zero
    ZeroInterval,
}
