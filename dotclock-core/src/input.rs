//! Front panel buttons

/// Number of buttons
pub const BUTTON_COUNT: usize = 5;

/// Front panel buttons
///
/// The discriminant is the button's one-byte id and its debouncer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Button {
    /// Increase the edited value
    Up = 0,
    /// Decrease the edited value
    Down = 1,
    /// Cycle the time field being set
    Set = 2,
    /// Cycle the bottom half of the clock face
    Switch = 3,
    /// Toggle clock and spectrum views
    Function = 4,
}

impl Button {
    /// All buttons in id order
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Up,
        Button::Down,
        Button::Set,
        Button::Switch,
        Button::Function,
    ];

    /// One-byte id
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Debouncer slot
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a button by id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// +1 for Up, -1 for Down, 0 otherwise
    pub const fn step(self) -> i8 {
        match self {
            Button::Up => 1,
            Button::Down => -1,
            _ => 0,
        }
    }
}
