//! UI state definition
//!
//! All redraw decisions are a function of this state, the wall clock and
//! the animation timers.

use super::events::Effect;
use crate::config::{Tiling, MAX_GAIN};
use crate::input::Button;

/// Gain change per Up/Down press in the spectrum view
pub const GAIN_STEP: u8 = 5;

/// Top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    /// Clock face
    #[default]
    Clock,
    /// Audio spectrum bars
    Spectrum,
}

impl View {
    /// The other view
    pub const fn toggled(self) -> Self {
        match self {
            View::Clock => View::Spectrum,
            View::Spectrum => View::Clock,
        }
    }
}

/// Content of the clock face's bottom half
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BottomMode {
    /// TV icon, dither bars and seconds
    #[default]
    Seconds,
    /// Four-digit year
    Year,
    /// Month and day
    Date,
}

impl BottomMode {
    /// Next mode in Switch order
    pub const fn next(self) -> Self {
        match self {
            BottomMode::Seconds => BottomMode::Year,
            BottomMode::Year => BottomMode::Date,
            BottomMode::Date => BottomMode::Seconds,
        }
    }
}

/// Time field edited in setting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingField {
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl SettingField {
    /// Next field in Set order; `None` means not setting
    pub const fn advance(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(SettingField::Minute),
            Some(SettingField::Minute) => Some(SettingField::Hour),
            Some(SettingField::Hour) => Some(SettingField::Day),
            Some(SettingField::Day) => Some(SettingField::Month),
            Some(SettingField::Month) => Some(SettingField::Year),
            Some(SettingField::Year) => None,
        }
    }
}

/// UI state owned by the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiState {
    view: View,
    bottom: BottomMode,
    setting: Option<SettingField>,
    gain: u8,
    tiling: Tiling,
}

impl UiState {
    /// Start on the clock face with the given spectrum gain and wiring
    pub fn new(gain: u8, tiling: Tiling) -> Self {
        Self {
            view: View::Clock,
            bottom: BottomMode::Seconds,
            setting: None,
            gain: gain.min(MAX_GAIN),
            tiling,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn bottom(&self) -> BottomMode {
        self.bottom
    }

    pub fn setting(&self) -> Option<SettingField> {
        self.setting
    }

    pub fn gain(&self) -> u8 {
        self.gain
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    /// Process a debounced button press
    ///
    /// This is the core transition logic. The returned effect, if any, is
    /// carried out by the caller.
    pub fn handle(&mut self, button: Button) -> Option<Effect> {
        match (self.view, button) {
            (_, Button::Function) => {
                self.view = self.view.toggled();
                Some(Effect::ViewChanged(self.view))
            }

            // No bottom half in the spectrum view; Switch picks the wiring
            (View::Spectrum, Button::Switch) => {
                self.tiling = self.tiling.next();
                Some(Effect::ChangeWiring(self.tiling))
            }
            (View::Clock, Button::Switch) => {
                self.bottom = self.bottom.next();
                None
            }

            (_, Button::Set) => {
                self.setting = SettingField::advance(self.setting);
                if self.setting.is_none() {
                    self.bottom = BottomMode::Seconds;
                }
                None
            }

            (View::Spectrum, Button::Up) => {
                self.gain = self.gain.saturating_add(GAIN_STEP).min(MAX_GAIN);
                Some(Effect::PersistGain(self.gain))
            }
            (View::Spectrum, Button::Down) => {
                self.gain = self.gain.saturating_sub(GAIN_STEP);
                Some(Effect::PersistGain(self.gain))
            }

            (View::Clock, Button::Up | Button::Down) => {
                self.setting.map(|field| Effect::AdjustTime {
                    field,
                    delta: button.step(),
                })
            }
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(0, Tiling::Horizontal)
    }
}
