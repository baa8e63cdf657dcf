//! Boot splash with a progress bar

use crate::bitmaps::{TV_HEIGHT, TV_OPEN, TV_WIDTH};
use crate::canvas::Canvas;
use crate::mapping::PixelMapping;

/// Number of progress frames
pub const LOADING_FRAMES: u8 = 31;

/// Progress bar outline: x, y, width, height
const BAR: (i32, i32, u32, u32) = (0, 9, 32, 6);

/// Loading screen animation
#[derive(Debug, Default)]
pub struct LoadingScreen {
    frame: u8,
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self { frame: 0 }
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.frame >= LOADING_FRAMES
    }

    /// Draw the next frame; returns false once all frames were shown
    pub fn next_frame<M: PixelMapping>(&mut self, canvas: &mut Canvas<M>) -> bool {
        if self.is_done() {
            return false;
        }
        self.frame += 1;

        canvas.clear_screen();
        canvas.set_cursor(0, 1);
        canvas.print("BILI");
        canvas.draw_bitmap(24, 0, &TV_OPEN, TV_WIDTH, TV_HEIGHT);

        let (x, y, w, h) = BAR;
        canvas.draw_round_rect(x, y, w, h, 1, true);
        canvas.fill_round_rect(x, y, self.frame as u32 + 1, h, 1, true);
        true
    }
}
