//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use dotclock_core::config::SettingsChange;
use dotclock_core::input::{Button, BUTTON_COUNT};
use dotclock_core::state::Work;
use dotclock_core::timing::Debouncer;

use crate::config::DISPLAY_CONFIG;

/// Channel capacity for debounced button presses
const BUTTON_CHANNEL_SIZE: usize = 8;

/// Channel capacity for posted work
const WORK_CHANNEL_SIZE: usize = 4;

/// Channel capacity for settings changes awaiting a flash write
const SETTINGS_CHANNEL_SIZE: usize = 8;

/// Debounced button presses, drained by the render loop
///
/// A full channel drops the press.
pub static BUTTONS: Channel<CriticalSectionRawMutex, Button, BUTTON_CHANNEL_SIZE> =
    Channel::new();

/// Work posted to the render loop from other contexts
pub static WORK: Channel<CriticalSectionRawMutex, Work, WORK_CHANNEL_SIZE> = Channel::new();

/// Settings changed from the buttons, drained by the settings task
pub static SETTINGS_CHANGES: Channel<CriticalSectionRawMutex, SettingsChange, SETTINGS_CHANNEL_SIZE> =
    Channel::new();

/// Per-button debounce state, shared by all button tasks
pub static DEBOUNCER: Debouncer<BUTTON_COUNT> =
    Debouncer::new(DISPLAY_CONFIG.intervals.debounce_ms);
