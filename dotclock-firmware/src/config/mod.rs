//! Configuration loading
//!
//! The display configuration is compiled in from display.toml; runtime
//! settings are loaded from flash with the compiled defaults as fallback.

pub mod settings;

pub use settings::{load_settings, save_settings, SettingsError};

include!(concat!(env!("OUT_DIR"), "/display_config.rs"));
