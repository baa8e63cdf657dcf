//! RP2040-specific HAL for the dot-matrix clock firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `dotclock-hal` traits:
//!
//! - Button inputs with falling-edge wakeups (implements `dotclock_hal::EdgeInput`)
//! - DMA-backed ADC block sampler (implements `dotclock_hal::SampleSource`)
//! - Flash storage driver (implements `dotclock_hal::FlashStorage`)

#![no_std]

pub mod adc;
pub mod flash;
pub mod gpio;

// Re-export shared traits from dotclock-hal for convenience
pub use dotclock_hal::{EdgeInput, FlashStorage as FlashStorageTrait, SampleSource, StorageKey};
