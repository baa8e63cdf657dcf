//! Configuration types
//!
//! Board-agnostic configuration structures. The display configuration is
//! fixed at build time; settings are the few values changed from the buttons
//! and persisted as postcard binary data.

pub mod display;
pub mod settings;

pub use display::*;
pub use settings::*;
