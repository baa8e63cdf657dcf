//! Dotclock - LED Dot-Matrix Clock Firmware
//!
//! Main firmware binary for an RP2040 driving a chain of MAX7219 8x8 LED
//! modules. Shows a clock face or an audio spectrum of the microphone
//! input, switched and adjusted with five buttons.
//!
//! Pin assignment:
//! - GPIO19: DIN, GPIO18: CLK, GPIO17: CS (MAX7219 chain)
//! - GPIO10-14: Up, Down, Set, Switch, Function buttons (to ground)
//! - GPIO26 (ADC0): microphone amplifier output

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dotclock_core::clock::WallClock;
use dotclock_core::input::Button;
use dotclock_core::state::{UiState, Work};
use dotclock_display::{Canvas, ClockFace, LoadingScreen, SpectrumPipeline};
use dotclock_drivers::{EhOutput, Max7219};
use dotclock_hal_rp2040::adc::AdcSampler;
use dotclock_hal_rp2040::flash::Rp2040FlashStorage;
use dotclock_hal_rp2040::gpio::ButtonInput;
use dotclock_hal_rp2040::SampleSource;

use crate::channels::WORK;
use crate::config::{load_settings, BUILD_UNIX_TIME, DISPLAY_CONFIG};
use crate::tasks::RenderContext;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// The render state holds the sample and FFT blocks; keep it off the stack
static RENDER: StaticCell<RenderContext> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Dotclock firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut display_config = DISPLAY_CONFIG;
    if let Err(e) = display_config.validate() {
        error!("Invalid display configuration: {:?}", e);
        panic!("invalid display configuration");
    }

    // A wiring picked from the buttons overrides the compiled one
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let settings = load_settings(&mut storage, &display_config).await;
    if !settings.wiring.is_empty() && settings.tiling().is_none() {
        warn!(
            "Unknown wiring '{}', keeping {:?}",
            settings.wiring.as_str(),
            display_config.tiling
        );
    }
    display_config.tiling = settings.tiling_or(display_config.tiling);

    // Ring oscillator jitter, so boards side by side dither differently
    let seed = RoscRng.next_u64();

    // LED chain: configured, then powered up at the boot intensity
    let mut matrix = match Max7219::new(
        EhOutput::new(Output::new(p.PIN_19, Level::Low)),
        EhOutput::new(Output::new(p.PIN_18, Level::Low)),
        EhOutput::new(Output::new(p.PIN_17, Level::High)),
        display_config.chain_length as usize,
    ) {
        Ok(matrix) => matrix,
        Err(e) => {
            error!("LED chain setup failed: {:?}", e);
            panic!("LED chain setup failed");
        }
    };
    matrix.set_intensity_all(display_config.intensity);
    matrix.set_power_all(true);
    info!(
        "LED chain: {} modules, {}x{} {:?}",
        display_config.chain_length,
        display_config.width,
        display_config.height,
        display_config.tiling
    );

    let mut canvas = match Canvas::from_config(&display_config) {
        Ok(canvas) => canvas,
        Err(e) => {
            error!("Canvas setup failed: {:?}", e);
            panic!("canvas setup failed");
        }
    };

    let mut loading = LoadingScreen::new();
    while loading.next_frame(&mut canvas) {
        canvas.display(&mut matrix);
        Timer::after_millis(display_config.intervals.loading_frame_ms as u64).await;
    }

    // Microphone sampling
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let mic = Channel::new_pin(p.PIN_26, Pull::None);
    let sampler = match AdcSampler::new(adc, mic, p.DMA_CH1, display_config.sample_rate_hz) {
        Ok(sampler) => sampler,
        Err(e) => {
            error!("ADC sampler setup failed: {:?}", e);
            panic!("ADC sampler setup failed");
        }
    };
    info!(
        "Sampling {} Hz, divider {}, block {}",
        sampler.sample_rate(),
        sampler.divider(),
        display_config.sample_size
    );
    let spectrum = match SpectrumPipeline::from_config(sampler, &display_config) {
        Ok(spectrum) => spectrum,
        Err(e) => {
            error!("Spectrum setup failed: {:?}", e);
            panic!("spectrum setup failed");
        }
    };

    let now_ms = Instant::now().as_millis();
    let clock = match WallClock::new(display_config.utc_offset_minutes, now_ms) {
        Ok(clock) => clock,
        Err(e) => {
            error!("Clock setup failed: {:?}", e);
            panic!("clock setup failed");
        }
    };

    // No RTC: start from the build time until the clock is set
    if WORK.try_send(Work::SetTime(BUILD_UNIX_TIME)).is_err() {
        warn!("Work queue full at boot");
    }

    let ctx = RENDER.init(RenderContext {
        matrix,
        canvas,
        spectrum,
        face: ClockFace::new(&display_config.intervals, seed),
        clock,
        ui: UiState::new(settings.gain, display_config.tiling),
        loop_slice_ms: display_config.intervals.loop_slice_ms,
    });

    spawner.spawn(tasks::render_task(ctx)).unwrap();
    spawner
        .spawn(tasks::settings_task(storage, settings))
        .unwrap();

    spawner
        .spawn(tasks::button_task(ButtonInput::new(p.PIN_10), Button::Up))
        .unwrap();
    spawner
        .spawn(tasks::button_task(ButtonInput::new(p.PIN_11), Button::Down))
        .unwrap();
    spawner
        .spawn(tasks::button_task(ButtonInput::new(p.PIN_12), Button::Set))
        .unwrap();
    spawner
        .spawn(tasks::button_task(ButtonInput::new(p.PIN_13), Button::Switch))
        .unwrap();
    spawner
        .spawn(tasks::button_task(ButtonInput::new(p.PIN_14), Button::Function))
        .unwrap();

    info!("All tasks spawned");
}
