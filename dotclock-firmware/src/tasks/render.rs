//! Render loop
//!
//! Owns the canvas, the LED chain and the spectrum sampler. Each iteration:
//! 1. Apply work posted from other contexts
//! 2. Feed queued button presses through the UI state machine
//! 3. Repaint the active view
//! 4. Flush the canvas to the chain
//! 5. Sleep one loop slice

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::DMA_CH1;
use embassy_time::{Instant, Timer};

use dotclock_core::clock::WallClock;
use dotclock_core::state::{Effect, UiState, View, Work};
use dotclock_core::config::Tiling;
use dotclock_display::{Canvas, ClockFace, PixelMap, SpectrumPipeline};
use dotclock_drivers::{EhOutput, Max7219};
use dotclock_hal_rp2040::adc::AdcSampler;

use crate::channels::{BUTTONS, SETTINGS_CHANGES, WORK};

/// The LED chain on its three bit-banged lines
pub type Matrix =
    Max7219<EhOutput<Output<'static>>, EhOutput<Output<'static>>, EhOutput<Output<'static>>>;

/// Microphone sampler
pub type Sampler = AdcSampler<'static, DMA_CH1>;

/// Everything the render loop owns
pub struct RenderContext {
    pub matrix: Matrix,
    pub canvas: Canvas,
    pub spectrum: SpectrumPipeline<Sampler>,
    pub face: ClockFace,
    pub clock: WallClock,
    pub ui: UiState,
    pub loop_slice_ms: u32,
}

impl RenderContext {
    fn apply_work(&mut self, work: Work, now_ms: u64) {
        match work {
            Work::SetTime(unix) => {
                if let Err(e) = self.clock.set_unix(unix, now_ms) {
                    warn!("Ignoring time {}: {:?}", unix, e);
                }
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect, now_ms: u64) {
        match effect {
            Effect::AdjustTime { field, delta } => {
                self.clock.adjust(field, delta, now_ms);
            }
            Effect::PersistGain(gain) => {
                debug!("Gain now {}", gain);
            }
            Effect::ChangeWiring(tiling) => self.remap(tiling),
            Effect::ViewChanged(view) => self.enter(view),
        }

        if let Some(change) = effect.settings_change() {
            if SETTINGS_CHANGES.try_send(change).is_err() {
                warn!("Settings queue full, dropping {:?}", change);
            }
        }
    }

    fn remap(&mut self, tiling: Tiling) {
        let map = PixelMap::new(
            self.matrix.device_count(),
            self.canvas.width(),
            self.canvas.height(),
            tiling,
        );
        match map {
            Ok(map) => {
                info!("Wiring now {:?}", tiling);
                self.canvas.set_mapping(map);
            }
            Err(e) => warn!("Cannot map {:?}: {:?}", tiling, e),
        }
    }

    fn enter(&mut self, view: View) {
        info!("Showing {:?}", view);
        if view == View::Spectrum {
            self.spectrum.reset();
        }
    }

    async fn repaint(&mut self, now_ms: u64) {
        match self.ui.view() {
            View::Clock => {
                let now = self.clock.now(now_ms);
                self.face.render(&mut self.canvas, &self.ui, &now, now_ms);
            }
            View::Spectrum => {
                let gain = self.ui.gain();
                if let Err(e) = self
                    .spectrum
                    .render_frame(&mut self.canvas, gain, now_ms)
                    .await
                {
                    error!("Sampling failed: {:?}", e);
                    // Keep showing the last bars
                    self.spectrum.draw(&mut self.canvas);
                }
            }
        }
    }
}

#[embassy_executor::task]
pub async fn render_task(ctx: &'static mut RenderContext) {
    info!("Render task started");

    loop {
        let now_ms = Instant::now().as_millis();

        while let Ok(work) = WORK.try_receive() {
            ctx.apply_work(work, now_ms);
        }

        while let Ok(button) = BUTTONS.try_receive() {
            trace!("Button {:?}", button);
            if let Some(effect) = ctx.ui.handle(button) {
                ctx.apply_effect(effect, now_ms);
            }
        }

        ctx.repaint(now_ms).await;
        ctx.canvas.display(&mut ctx.matrix);

        Timer::after_millis(ctx.loop_slice_ms as u64).await;
    }
}
