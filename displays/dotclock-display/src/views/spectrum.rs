//! Spectrum pipeline
//!
//! acquire (block ADC read) → FFT amplitudes → bar heights with falling
//! peaks → canvas. One bar per canvas column, bins 1..=width.

use dotclock_core::config::{ConfigError, DisplayConfig, MAX_SAMPLES};
use dotclock_core::spectrum::{Analyzer, Bars, SampleSize};
use dotclock_core::timing::IntervalTimer;
use dotclock_hal::{SampleError, SampleSource};

use crate::canvas::Canvas;
use crate::mapping::PixelMapping;

/// Extra attempts after a `Busy` read before holding the previous block
pub const BUSY_RETRIES: u8 = 3;

/// Sampler, FFT working storage and bar state
pub struct SpectrumPipeline<S> {
    source: S,
    samples: [u16; MAX_SAMPLES],
    analyzer: Analyzer,
    bars: Bars,
    decay: IntervalTimer,
}

impl<S: SampleSource> SpectrumPipeline<S> {
    pub fn new(source: S, size: SampleSize, bars: usize, max_row: u8, decay_ms: u32) -> Self {
        Self {
            source,
            samples: [0; MAX_SAMPLES],
            analyzer: Analyzer::new(size),
            bars: Bars::new(bars, max_row),
            decay: IntervalTimer::new(decay_ms),
        }
    }

    pub fn from_config(source: S, config: &DisplayConfig) -> Result<Self, ConfigError> {
        let size = SampleSize::from_len(config.sample_size).ok_or(ConfigError::InvalidSampleSize)?;
        Ok(Self::new(
            source,
            size,
            config.width as usize,
            config.max_row(),
            config.intervals.decay_ms,
        ))
    }

    /// Current sample block
    pub fn samples(&self) -> &[u16] {
        &self.samples[..self.analyzer.size().len()]
    }

    pub fn bars(&self) -> &Bars {
        &self.bars
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop bars and peaks, e.g. when the view is re-entered
    pub fn reset(&mut self) {
        self.bars.clear();
        self.decay.reset();
    }

    /// Read the next sample block
    ///
    /// Returns the number of fresh samples. A partial read replaces only the
    /// head of the block. If the sampler stays busy the previous block is
    /// kept and 0 is returned. Other errors are passed up.
    pub async fn acquire(&mut self) -> Result<usize, SampleError> {
        let n = self.analyzer.size().len();

        for _ in 0..=BUSY_RETRIES {
            match self.source.read(&mut self.samples[..n]).await {
                Ok(count) => return Ok(count.min(n)),
                Err(e) if e.is_transient() => embassy_futures::yield_now().await,
                Err(e) => return Err(e),
            }
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("sampler busy, holding previous block");
        Ok(0)
    }

    /// Acquire, analyze and draw one frame
    pub async fn render_frame<M: PixelMapping>(
        &mut self,
        canvas: &mut Canvas<M>,
        gain: u8,
        now_ms: u64,
    ) -> Result<(), SampleError> {
        self.acquire().await?;

        let n = self.analyzer.size().len();
        let amplitudes = self.analyzer.process(&self.samples[..n]);
        self.bars.update(amplitudes, gain);
        if self.decay.poll(now_ms) {
            self.bars.decay();
        }

        self.draw(canvas);
        Ok(())
    }

    /// Draw the current bars and peaks
    pub fn draw<M: PixelMapping>(&self, canvas: &mut Canvas<M>) {
        canvas.clear_screen();
        let bottom = canvas.height() as i32 - 1;

        let columns = self.bars.heights().iter().zip(self.bars.peaks());
        for (x, (&height, &peak)) in columns.enumerate() {
            let x = x as i32;
            canvas.draw_line(x, bottom, x, bottom - height as i32, true);
            canvas.set_pixel(x, bottom - peak as i32, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PixelMap;
    use core::cell::Cell;
    use dotclock_core::config::Tiling;
    use embassy_futures::block_on;
    use heapless::Deque;

    #[derive(Clone, Copy)]
    enum Step {
        /// Fill `count` samples with `value`
        Fill(u16, usize),
        Fail(SampleError),
    }

    /// Replays a script of read results, then fills full blocks with 0
    struct Scripted {
        steps: Deque<Step, 16>,
        reads: Cell<u32>,
    }

    impl Scripted {
        fn new(steps: &[Step]) -> Self {
            let mut deque = Deque::new();
            for &step in steps {
                let _ = deque.push_back(step);
            }
            Self {
                steps: deque,
                reads: Cell::new(0),
            }
        }
    }

    impl SampleSource for Scripted {
        async fn read(&mut self, buffer: &mut [u16]) -> Result<usize, SampleError> {
            self.reads.set(self.reads.get() + 1);
            match self.steps.pop_front().unwrap_or(Step::Fill(0, usize::MAX)) {
                Step::Fill(value, count) => {
                    let count = count.min(buffer.len());
                    buffer[..count].fill(value);
                    Ok(count)
                }
                Step::Fail(e) => Err(e),
            }
        }

        fn sample_rate(&self) -> u32 {
            50_000
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(32, 16, PixelMap::new(8, 32, 16, Tiling::Horizontal).unwrap()).unwrap()
    }

    fn pipeline(steps: &[Step]) -> SpectrumPipeline<Scripted> {
        SpectrumPipeline::from_config(Scripted::new(steps), &DisplayConfig::DEFAULT).unwrap()
    }

    #[test]
    fn test_busy_retried() {
        let mut p = pipeline(&[
            Step::Fail(SampleError::Busy),
            Step::Fail(SampleError::Busy),
            Step::Fill(7, 128),
        ]);
        assert_eq!(block_on(p.acquire()), Ok(128));
        assert_eq!(p.source().reads.get(), 3);
        assert!(p.samples().iter().all(|&s| s == 7));
    }

    #[test]
    fn test_busy_exhausted_holds_block() {
        let mut p = pipeline(&[
            Step::Fill(9, 128),
            Step::Fail(SampleError::Busy),
            Step::Fail(SampleError::Busy),
            Step::Fail(SampleError::Busy),
            Step::Fail(SampleError::Busy),
        ]);
        assert_eq!(block_on(p.acquire()), Ok(128));
        assert_eq!(block_on(p.acquire()), Ok(0));
        assert_eq!(p.source().reads.get(), 1 + 1 + BUSY_RETRIES as u32);
        assert!(p.samples().iter().all(|&s| s == 9));
    }

    #[test]
    fn test_partial_read_replaces_head() {
        let mut p = pipeline(&[Step::Fill(5, 128), Step::Fill(6, 10)]);
        block_on(p.acquire()).unwrap();
        assert_eq!(block_on(p.acquire()), Ok(10));
        assert!(p.samples()[..10].iter().all(|&s| s == 6));
        assert!(p.samples()[10..].iter().all(|&s| s == 5));
    }

    #[test]
    fn test_init_error_passed_up() {
        let mut p = pipeline(&[Step::Fail(SampleError::Init)]);
        let mut c = canvas();
        c.fill_screen(true);
        assert_eq!(block_on(p.render_frame(&mut c, 10, 0)), Err(SampleError::Init));
        // Canvas untouched on failure
        assert!(c.buffer().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_silence_draws_bottom_row() {
        let mut p = pipeline(&[Step::Fill(2048, 128)]);
        let mut c = canvas();
        block_on(p.render_frame(&mut c, 10, 0)).unwrap();

        for y in 0..16 {
            for x in 0..32 {
                assert_eq!(c.pixel(x, y), y == 15, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_bars_and_peaks_drawn() {
        let mut p = pipeline(&[]);
        let mut c = canvas();
        block_on(p.render_frame(&mut c, 1, 0)).unwrap();

        // Fake a frame with one tall bar that has since fallen
        p.bars = Bars::new(32, 15);
        p.bars.update(&[0.0, 0.0, 0.0, 9.0], 1);
        p.bars.update(&[0.0, 0.0, 0.0, 4.0], 1);
        p.draw(&mut c);

        // Column 2 holds bin 3: bar up to row 11, peak at row 6
        for y in 0..16 {
            let expected = y >= 11 || y == 6;
            assert_eq!(c.pixel(2, y), expected, "row {}", y);
        }
    }

    #[test]
    fn test_conversion_error_not_retried() {
        let mut p = pipeline(&[Step::Fail(SampleError::Conversion), Step::Fill(7, 128)]);
        assert_eq!(block_on(p.acquire()), Err(SampleError::Conversion));
        assert_eq!(p.source().reads.get(), 1);
    }

    #[test]
    fn test_peaks_fall_on_decay_tick() {
        let mut p = pipeline(&[]);
        let mut c = canvas();

        // First frame: the decay timer fires and arms
        block_on(p.render_frame(&mut c, 1, 0)).unwrap();
        p.bars.update(&[0.0, 0.0, 0.0, 9.0], 1);
        assert_eq!(p.bars().peaks()[2], 9);

        // Silence from here on; bars drop to 0, the peak waits for the tick
        block_on(p.render_frame(&mut c, 1, 49)).unwrap();
        assert_eq!(p.bars().heights()[2], 0);
        assert_eq!(p.bars().peaks()[2], 9);
        assert!(c.pixel(2, 15 - 9));

        block_on(p.render_frame(&mut c, 1, 50)).unwrap();
        assert_eq!(p.bars().peaks()[2], 8);
        assert!(!c.pixel(2, 15 - 9));
        assert!(c.pixel(2, 15 - 8));

        block_on(p.render_frame(&mut c, 1, 99)).unwrap();
        assert_eq!(p.bars().peaks()[2], 8);

        block_on(p.render_frame(&mut c, 1, 100)).unwrap();
        assert_eq!(p.bars().peaks()[2], 7);
    }

    #[test]
    fn test_tone_raises_its_bar() {
        let mut p = pipeline(&[]);
        // Square-ish tone at bin 4 of a 128 block
        let mut block = [0u16; 128];
        for (i, s) in block.iter_mut().enumerate() {
            *s = if (i / 16) % 2 == 0 { 3000 } else { 1000 };
        }
        p.samples[..128].copy_from_slice(&block);

        let amplitudes = p.analyzer.process(&block);
        p.bars.update(amplitudes, 100);
        let heights = p.bars.heights();

        // Bar 3 is bin 4
        assert!(heights[3] > 0);
        assert!(heights.iter().enumerate().all(|(i, &h)| i == 3 || h <= heights[3]));
    }
}
