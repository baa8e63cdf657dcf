//! Bar heights and falling peaks

use heapless::Vec;

/// Maximum number of bars (one per canvas column)
pub const MAX_BARS: usize = 128;

/// Height of one bar for an amplitude
///
/// `min(max_row, amplitude / max(gain, 1))`. Non-finite or negative input
/// gives 0.
pub fn bar_height(amplitude: f32, gain: u8, max_row: u8) -> u8 {
    let scaled = amplitude / gain.max(1) as f32;
    if scaled >= max_row as f32 {
        max_row
    } else if scaled > 0.0 {
        scaled as u8
    } else {
        0
    }
}

/// Per-column bar heights and peaks
#[derive(Debug, Clone)]
pub struct Bars {
    heights: Vec<u8, MAX_BARS>,
    peaks: Vec<u8, MAX_BARS>,
    max_row: u8,
}

impl Bars {
    /// Create `count` flat bars (capped at [`MAX_BARS`])
    pub fn new(count: usize, max_row: u8) -> Self {
        let count = count.min(MAX_BARS);
        let mut heights = Vec::new();
        let mut peaks = Vec::new();
        // count <= capacity, so these cannot fail
        let _ = heights.resize(count, 0);
        let _ = peaks.resize(count, 0);
        Self {
            heights,
            peaks,
            max_row,
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn max_row(&self) -> u8 {
        self.max_row
    }

    pub fn heights(&self) -> &[u8] {
        &self.heights
    }

    pub fn peaks(&self) -> &[u8] {
        &self.peaks
    }

    /// Set bar heights from amplitudes
    ///
    /// Bar `i` takes bin `i + 1`; the DC bin is skipped. Bars without a bin
    /// drop to 0. Peaks rise to any taller bar.
    pub fn update(&mut self, amplitudes: &[f32], gain: u8) {
        let bins = amplitudes.get(1..).unwrap_or(&[]);
        let max_row = self.max_row;
        for (i, (height, peak)) in self.heights.iter_mut().zip(self.peaks.iter_mut()).enumerate() {
            *height = bins
                .get(i)
                .map_or(0, |&amp| bar_height(amp, gain, max_row));
            *peak = (*peak).max(*height);
        }
    }

    /// One decay step: every non-zero peak falls by one row
    pub fn decay(&mut self) {
        for peak in self.peaks.iter_mut() {
            *peak = peak.saturating_sub(1);
        }
    }

    /// Drop all bars and peaks to zero
    pub fn clear(&mut self) {
        self.heights.iter_mut().for_each(|h| *h = 0);
        self.peaks.iter_mut().for_each(|p| *p = 0);
    }
}
