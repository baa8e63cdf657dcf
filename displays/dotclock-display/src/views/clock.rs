//! Clock face
//!
//! ```text
//!  x: 0    2          15 16  19          31
//!     ┌──────────────────────────────────┐
//!  0  │    H H        :    M M           │  top half
//!  8  │ TV  ▁▃▇▂▅▁▆▄▂     S S            │  bottom half (seconds mode)
//!     └──────────────────────────────────┘
//! ```
//!
//! The bottom half shows seconds, the year or the date. While a time field
//! is being set, that field blinks.

use core::fmt::Write;

use dotclock_core::config::Intervals;
use dotclock_core::state::{BottomMode, SettingField, UiState};
use dotclock_core::timing::{Blinker, IntervalTimer};
use heapless::String;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use time::PrimitiveDateTime;

use crate::bitmaps::{tv_frame, TV_HEIGHT, TV_WIDTH};
use crate::canvas::Canvas;
use crate::mapping::PixelMapping;

/// Number of dither bars in the seconds view
pub const DITHER_BARS: usize = 9;

/// Colon dots between hours and minutes
const COLON: [(i32, i32); 8] = [
    (15, 2),
    (16, 2),
    (15, 3),
    (16, 3),
    (15, 5),
    (16, 5),
    (15, 6),
    (16, 6),
];

/// Clock face renderer with its animation state
pub struct ClockFace {
    colon: Blinker,
    field_blink: Blinker,
    dither_timer: IntervalTimer,
    dither: [u8; DITHER_BARS],
    rng: SmallRng,
}

impl ClockFace {
    /// `seed` drives the dither bars; give each board its own
    pub fn new(intervals: &Intervals, seed: u64) -> Self {
        Self {
            colon: Blinker::new(intervals.colon_blink_ms),
            field_blink: Blinker::new(intervals.setting_blink_ms),
            dither_timer: IntervalTimer::new(intervals.dither_ms),
            dither: [0; DITHER_BARS],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Current dither bar heights (0-7)
    pub fn dither(&self) -> &[u8; DITHER_BARS] {
        &self.dither
    }

    /// Repaint the canvas for `now`
    pub fn render<M: PixelMapping>(
        &mut self,
        canvas: &mut Canvas<M>,
        ui: &UiState,
        now: &PrimitiveDateTime,
        now_ms: u64,
    ) {
        canvas.clear_screen();

        print_at(canvas, 2, 1, format_args!("{:02}", now.hour()));
        if self.colon.poll(now_ms) {
            for (x, y) in COLON {
                canvas.set_pixel(x, y, true);
            }
        }
        print_at(canvas, 19, 1, format_args!("{:02}", now.minute()));

        let Some(field) = ui.setting() else {
            self.draw_bottom(canvas, ui.bottom(), now, now_ms);
            return;
        };

        let off = self.field_blink.poll(now_ms);
        match field {
            SettingField::Year => {
                if !off {
                    draw_year(canvas, now);
                }
            }
            SettingField::Month => {
                draw_date(canvas, now);
                if off {
                    canvas.fill_rect(0, 9, 14, 8, false);
                }
            }
            SettingField::Day => {
                draw_date(canvas, now);
                if off {
                    canvas.fill_rect(19, 9, 13, 8, false);
                }
            }
            SettingField::Hour => {
                self.draw_bottom(canvas, ui.bottom(), now, now_ms);
                if off {
                    canvas.fill_rect(0, 0, 15, 8, false);
                }
            }
            SettingField::Minute => {
                self.draw_bottom(canvas, ui.bottom(), now, now_ms);
                if off {
                    canvas.fill_rect(17, 0, 14, 8, false);
                }
            }
        }
    }

    fn draw_bottom<M: PixelMapping>(
        &mut self,
        canvas: &mut Canvas<M>,
        mode: BottomMode,
        now: &PrimitiveDateTime,
        now_ms: u64,
    ) {
        match mode {
            BottomMode::Seconds => self.draw_seconds(canvas, now, now_ms),
            BottomMode::Year => draw_year(canvas, now),
            BottomMode::Date => draw_date(canvas, now),
        }
    }

    fn draw_seconds<M: PixelMapping>(
        &mut self,
        canvas: &mut Canvas<M>,
        now: &PrimitiveDateTime,
        now_ms: u64,
    ) {
        canvas.draw_bitmap(0, 8, tv_frame(now.second()), TV_WIDTH, TV_HEIGHT);

        if self.dither_timer.poll(now_ms) {
            for bar in self.dither.iter_mut() {
                *bar = self.rng.random_range(0..8);
            }
        }
        for (i, &height) in self.dither.iter().enumerate() {
            let x = 9 + i as i32;
            canvas.draw_line(x, 15, x, 15 - height as i32, true);
        }

        print_at(canvas, 19, 9, format_args!("{:02}", now.second()));
    }
}

fn draw_year<M: PixelMapping>(canvas: &mut Canvas<M>, now: &PrimitiveDateTime) {
    print_at(canvas, 2, 9, format_args!("{} Y", now.year()));
}

fn draw_date<M: PixelMapping>(canvas: &mut Canvas<M>, now: &PrimitiveDateTime) {
    print_at(
        canvas,
        2,
        9,
        format_args!("{:02}-{:02}", u8::from(now.month()), now.day()),
    );
}

fn print_at<M: PixelMapping>(canvas: &mut Canvas<M>, x: i32, y: i32, args: core::fmt::Arguments) {
    let mut text: String<12> = String::new();
    // Overlong text is truncated, which the panel would clip anyway
    let _ = text.write_fmt(args);
    canvas.set_cursor(x, y);
    canvas.print(&text);
}
