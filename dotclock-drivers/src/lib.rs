//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in dotclock-core:
//!
//! - MAX7219/MAX7221 LED matrix chain (bit-banged)
//! - embedded-hal pin adapter for the bus lines

#![no_std]
#![deny(unsafe_code)]

pub mod matrix;
pub mod pin;

pub use matrix::{DeviceState, MatrixError, Max7219};
pub use pin::EhOutput;
