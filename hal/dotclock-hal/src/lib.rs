//! Dotclock Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the display pipeline
//! is written against. Chip-specific crates (currently RP2040) implement
//! them, and host tests implement them with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (dotclock-firmware)        │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │ dotclock-drivers │   │ dotclock-display │
//! └──────────────────┘   └──────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────────────────────────────┐
//! │  dotclock-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          ┌─────────────────────┐
//!          │ dotclock-hal-rp2040 │
//!          └─────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::EdgeInput`] - Digital I/O (bit-banged bus lines, buttons)
//! - [`adc::SampleSource`] - Block-based analog sampling (DMA backed)
//! - [`flash::FlashStorage`] - Persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{SampleError, SampleSource};
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{EdgeInput, OutputPin};
