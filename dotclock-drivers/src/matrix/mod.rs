//! LED matrix drivers

pub mod max7219;

pub use max7219::{DeviceState, MatrixError, Max7219};
