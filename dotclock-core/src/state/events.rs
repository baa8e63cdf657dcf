//! Side effects of UI transitions and work posted from other contexts

use super::machine::{SettingField, View};
use crate::config::{SettingsChange, Tiling};

/// Side effect requested by a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Shift a field of the wall clock by `delta` units
    AdjustTime {
        /// Field being edited
        field: SettingField,
        /// +1 or -1
        delta: i8,
    },
    /// Spectrum gain changed; persist it
    PersistGain(u8),
    /// A different chain wiring was picked; remap the canvas and persist it
    ChangeWiring(Tiling),
    /// The active view changed
    ViewChanged(View),
}

/// Work posted to the render loop
///
/// The render loop owns the canvas and the driver, so anything that touches
/// them from elsewhere goes through this queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Work {
    /// Set the wall clock to a unix timestamp (seconds, UTC)
    SetTime(i64),
}

impl Effect {
    /// The settings record change this effect implies, if any
    pub fn settings_change(&self) -> Option<SettingsChange> {
        match *self {
            Effect::PersistGain(gain) => Some(SettingsChange::Gain(gain)),
            Effect::ChangeWiring(tiling) => Some(SettingsChange::Wiring(tiling)),
            _ => None,
        }
    }
}
