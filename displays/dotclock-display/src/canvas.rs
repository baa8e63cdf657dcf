//! 1-bit canvas
//!
//! Row-major bitmap, `width / 8` bytes per row, bit 7 of each byte being the
//! leftmost pixel. Drawing never touches the hardware; [`Canvas::display`]
//! pushes the whole bitmap to the chain.

use dotclock_core::config::{ConfigError, DisplayConfig, CELL_SIZE, MAX_CANVAS_BYTES, MAX_DEVICES};
use dotclock_core::traits::LedMatrix;
use embedded_graphics::mono_font::ascii::FONT_5X7;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::mapping::{PixelMap, PixelMapping};

/// Rows per device cell
const CELL_ROWS: usize = CELL_SIZE as usize;

/// Text font: 5x7 glyphs on a 6 pixel pitch
pub const TEXT_FONT: MonoFont<'static> = MonoFont {
    character_spacing: 1,
    ..FONT_5X7
};

/// 1-bit bitmap laid over a chain of LED cells
pub struct Canvas<M = PixelMap> {
    width: u16,
    height: u16,
    buffer: [u8; MAX_CANVAS_BYTES],
    mapping: M,
    cursor: Point,
}

impl Canvas<PixelMap> {
    /// Canvas and stock mapping from a display configuration
    pub fn from_config(config: &DisplayConfig) -> Result<Self, ConfigError> {
        let mapping = PixelMap::from_config(config)?;
        Self::new(config.width, config.height, mapping)
    }
}

impl<M: PixelMapping> Canvas<M> {
    /// Create a blank canvas
    pub fn new(width: u16, height: u16, mapping: M) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || width % CELL_SIZE != 0 || height % CELL_SIZE != 0 {
            return Err(ConfigError::CanvasNotAligned);
        }
        if (width / CELL_SIZE) as usize * height as usize > MAX_CANVAS_BYTES {
            return Err(ConfigError::CanvasTooLarge);
        }
        Ok(Self {
            width,
            height,
            buffer: [0; MAX_CANVAS_BYTES],
            mapping,
            cursor: Point::zero(),
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Swap the pixel mapping, keeping the bitmap
    pub fn set_mapping(&mut self, mapping: M) {
        self.mapping = mapping;
    }

    fn bytes_per_row(&self) -> usize {
        (self.width / CELL_SIZE) as usize
    }

    /// The bitmap, row-major
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..self.bytes_per_row() * self.height as usize]
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * self.bytes_per_row() + x / 8, 0x80 >> (x % 8)))
    }

    /// Set or clear one pixel; outside the canvas is clipped
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((i, mask)) = self.index(x, y) {
            if on {
                self.buffer[i] |= mask;
            } else {
                self.buffer[i] &= !mask;
            }
        }
    }

    /// Read one pixel; outside the canvas reads as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|(i, mask)| self.buffer[i] & mask != 0)
    }

    /// Fill the whole canvas
    pub fn fill_screen(&mut self, on: bool) {
        let len = self.buffer().len();
        self.buffer[..len].fill(if on { 0xFF } else { 0x00 });
    }

    /// Turn every pixel off and home the cursor
    pub fn clear_screen(&mut self) {
        self.fill_screen(false);
        self.cursor = Point::zero();
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, on: bool) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::from(on)))
            .draw(self);
    }

    /// One pixel wide rectangle outline
    pub fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, on: bool) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::from(on), 1))
            .draw(self);
    }

    /// Line between two points, both ends included
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, on: bool) {
        let _ = Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::from(on), 1))
            .draw(self);
    }

    fn rounded(x: i32, y: i32, w: u32, h: u32, radius: u32) -> RoundedRectangle {
        RoundedRectangle::with_equal_corners(
            Rectangle::new(Point::new(x, y), Size::new(w, h)),
            Size::new(radius * 2, radius * 2),
        )
    }

    /// Rounded rectangle outline
    pub fn draw_round_rect(&mut self, x: i32, y: i32, w: u32, h: u32, radius: u32, on: bool) {
        let _ = Self::rounded(x, y, w, h, radius)
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::from(on), 1))
            .draw(self);
    }

    /// Filled rounded rectangle
    pub fn fill_round_rect(&mut self, x: i32, y: i32, w: u32, h: u32, radius: u32, on: bool) {
        let _ = Self::rounded(x, y, w, h, radius)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::from(on)))
            .draw(self);
    }

    /// Blit a packed 1-bit bitmap
    ///
    /// Rows are `(w + 7) / 8` bytes, MSB first. Set bits turn pixels on;
    /// clear bits leave the canvas untouched.
    pub fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &[u8], w: u32, h: u32) {
        let stride = w.div_ceil(8) as usize;
        for row in 0..h as usize {
            for col in 0..w as usize {
                let Some(&byte) = bitmap.get(row * stride + col / 8) else {
                    return;
                };
                if byte & (0x80 >> (col % 8)) != 0 {
                    self.set_pixel(x + col as i32, y + row as i32, true);
                }
            }
        }
    }

    /// Move the text cursor (top-left of the next glyph)
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Draw text in [`TEXT_FONT`] at the cursor and advance it
    pub fn print(&mut self, text: &str) {
        let style = MonoTextStyle::new(&TEXT_FONT, BinaryColor::On);
        let start = self.cursor;
        if let Ok(next) = Text::with_baseline(text, start, style, Baseline::Top).draw(self) {
            self.cursor = next;
        }
    }

    /// Push the bitmap to the chain
    ///
    /// Builds each device's eight row bytes through the mapping, then writes
    /// every row of every device exactly once, device by device.
    pub fn display<L: LedMatrix>(&self, matrix: &mut L) {
        let mut image = [[0u8; CELL_ROWS]; MAX_DEVICES];

        for y in 0..self.height {
            for x in 0..self.width {
                if !self.pixel(x as i32, y as i32) {
                    continue;
                }
                if let Some(addr) = self.mapping.locate(x, y) {
                    if let Some(rows) = image.get_mut(addr.device) {
                        rows[addr.row as usize] |= addr.mask();
                    }
                }
            }
        }

        let devices = matrix.device_count().min(MAX_DEVICES);
        for (device, rows) in image.iter().enumerate().take(devices) {
            for (row, &value) in rows.iter().enumerate() {
                matrix.set_row(device, row as u8, value);
            }
        }
    }
}

impl<M: PixelMapping> OriginDimensions for Canvas<M> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<M: PixelMapping> DrawTarget for Canvas<M> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color.is_on());
        Ok(())
    }
}
