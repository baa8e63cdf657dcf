//! Canvas, pixel mapping and views for the LED matrix
//!
//! This crate provides:
//! - `Canvas`: a 1-bit bitmap that is an embedded-graphics `DrawTarget`
//! - `PixelMapping` trait and the stock `PixelMap` for the supported wirings
//! - Views: clock face, spectrum pipeline, loading screen
//!
//! # Architecture
//!
//! ```text
//!   views ──draw──▶ Canvas ──display()──▶ LedMatrix (dotclock-core trait)
//!                     │
//!                     └── PixelMapping: (x, y) → (device, row, bit)
//! ```
//!
//! Views only ever touch the bitmap. `Canvas::display` composes one row
//! image per device through the mapping and writes every row register once.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bitmaps;
pub mod canvas;
pub mod mapping;
pub mod views;

// Re-export key types
pub use canvas::Canvas;
pub use mapping::{CellAddress, PixelMap, PixelMapping};
pub use views::{ClockFace, LoadingScreen, SpectrumPipeline};
