//! UI state machine
//!
//! Which view is shown, what the clock face's bottom half displays and which
//! time field is being edited. Buttons drive transitions; side effects are
//! returned to the caller rather than performed here.

pub mod events;
pub mod machine;

pub use events::{Effect, Work};
pub use machine::{BottomMode, SettingField, UiState, View, GAIN_STEP};
