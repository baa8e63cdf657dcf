//! Persisted runtime settings
//!
//! Values changed from the buttons that must survive a power cycle.
//! Serialized with postcard and checked with a CRC on load.

use core::future::Future;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::display::{Tiling, MAX_GAIN};

/// Magic number to identify valid settings
pub const SETTINGS_MAGIC: u32 = 0x444F_5443; // "DOTC"

/// Current settings format version
///
/// Version 1 stored the compiled wiring name; those records are discarded.
pub const SETTINGS_VERSION: u8 = 2;

/// Maximum length of the wiring name
pub const MAX_WIRING_LEN: usize = 16;

/// Settings stored in flash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Spectrum gain (0..=100)
    pub gain: u8,
    /// Wiring picked from the buttons, see [`Tiling::name`]
    ///
    /// Empty until one is picked; the compiled tiling applies meanwhile.
    pub wiring: String<MAX_WIRING_LEN>,
    /// CRC32 checksum (calculated over magic..wiring)
    pub crc: u32,
}

impl Settings {
    /// Create settings with a valid CRC and no wiring choice
    pub fn new(gain: u8) -> Self {
        let mut settings = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            gain: gain.min(MAX_GAIN),
            wiring: String::new(),
            crc: 0,
        };
        settings.update_crc();
        settings
    }

    /// Check if the header matches this firmware
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Picked wiring, if any and if the name is known
    pub fn tiling(&self) -> Option<Tiling> {
        Tiling::from_name(&self.wiring)
    }

    /// Tiling to drive the chain with: the picked wiring, else `compiled`
    pub fn tiling_or(&self, compiled: Tiling) -> Tiling {
        self.tiling().unwrap_or(compiled)
    }

    /// Change the gain and refresh the CRC
    pub fn set_gain(&mut self, gain: u8) {
        self.gain = gain.min(MAX_GAIN);
        self.update_crc();
    }

    /// Record a wiring picked from the buttons and refresh the CRC
    pub fn set_wiring(&mut self, tiling: Tiling) {
        self.wiring.clear();
        // Every tiling name fits in MAX_WIRING_LEN
        let _ = self.wiring.push_str(tiling.name());
        self.update_crc();
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version, self.gain]);
        crc = crc32_update(crc, self.wiring.as_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// A persisted value changed at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsChange {
    Gain(u8),
    Wiring(Tiling),
}

/// Latest value of each setting changed since the last write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingChanges {
    gain: Option<u8>,
    wiring: Option<Tiling>,
}

impl PendingChanges {
    pub fn record(&mut self, change: SettingsChange) {
        match change {
            SettingsChange::Gain(gain) => self.gain = Some(gain),
            SettingsChange::Wiring(tiling) => self.wiring = Some(tiling),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gain.is_none() && self.wiring.is_none()
    }

    /// Apply to `settings`, returning true if anything differs from what
    /// they already hold
    pub fn apply(self, settings: &mut Settings) -> bool {
        let mut changed = false;
        if let Some(gain) = self.gain.filter(|&g| g.min(MAX_GAIN) != settings.gain) {
            settings.set_gain(gain);
            changed = true;
        }
        if let Some(tiling) = self.wiring.filter(|&t| settings.tiling() != Some(t)) {
            settings.set_wiring(tiling);
            changed = true;
        }
        changed
    }
}

/// Record changes until `next` yields `None`
///
/// `next` waits for the next change and gives up with `None` after a quiet
/// period, so a burst of presses ends up as one write of the final values.
pub async fn collect_until_quiet<F, Fut>(pending: &mut PendingChanges, mut next: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<SettingsChange>>,
{
    while let Some(change) = next().await {
        pending.record(change);
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_new_settings_are_valid() {
        let settings = Settings::new(35);
        assert!(settings.is_valid());
        assert!(settings.verify_crc());
        assert_eq!(settings.tiling(), None);
        assert_eq!(settings.gain, 35);
    }

    #[test]
    fn test_gain_clamped() {
        let mut settings = Settings::new(250);
        assert_eq!(settings.gain, MAX_GAIN);

        settings.set_gain(101);
        assert_eq!(settings.gain, MAX_GAIN);
        assert!(settings.verify_crc());
    }

    #[test]
    fn test_saved_gain_keeps_compiled_wiring() {
        let mut settings = Settings::new(20);
        settings.set_gain(25);

        // A later build with another tiling must still get its own
        assert_eq!(settings.tiling_or(Tiling::Vertical), Tiling::Vertical);
        assert_eq!(settings.tiling_or(Tiling::Horizontal), Tiling::Horizontal);
    }

    #[test]
    fn test_picked_wiring_overrides_compiled() {
        let mut settings = Settings::new(20);
        settings.set_wiring(Tiling::VerticalFlip);
        assert!(settings.verify_crc());
        assert_eq!(settings.wiring.as_str(), "vertical-flip");
        assert_eq!(settings.tiling_or(Tiling::Horizontal), Tiling::VerticalFlip);

        settings.set_gain(5);
        assert_eq!(settings.tiling_or(Tiling::Horizontal), Tiling::VerticalFlip);
    }

    #[test]
    fn test_crc_detects_change() {
        let mut settings = Settings::new(10);
        settings.set_wiring(Tiling::Vertical);
        settings.gain = 11;
        assert!(!settings.verify_crc());

        settings.update_crc();
        settings.wiring.clear();
        assert!(!settings.verify_crc());
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard CRC-32 check input
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_unknown_wiring_falls_back() {
        let mut settings = Settings::new(10);
        let _ = settings.wiring.push_str("zigzag");
        assert_eq!(settings.tiling(), None);
        assert_eq!(settings.tiling_or(Tiling::Vertical), Tiling::Vertical);
    }

    #[test]
    fn test_pending_keeps_latest_of_each() {
        let mut pending = PendingChanges::default();
        assert!(pending.is_empty());
        pending.record(SettingsChange::Gain(25));
        pending.record(SettingsChange::Wiring(Tiling::Vertical));
        pending.record(SettingsChange::Gain(30));

        let mut settings = Settings::new(20);
        assert!(pending.apply(&mut settings));
        assert_eq!(settings.gain, 30);
        assert_eq!(settings.tiling(), Some(Tiling::Vertical));
        assert!(settings.verify_crc());
    }

    #[test]
    fn test_pending_skips_unchanged_values() {
        let mut settings = Settings::new(20);
        settings.set_wiring(Tiling::Vertical);

        let mut pending = PendingChanges::default();
        pending.record(SettingsChange::Gain(25));
        pending.record(SettingsChange::Gain(20));
        pending.record(SettingsChange::Wiring(Tiling::Vertical));
        assert!(!pending.apply(&mut settings));
    }

    #[test]
    fn test_collect_runs_until_quiet() {
        let mut script = [
            Some(SettingsChange::Gain(25)),
            Some(SettingsChange::Gain(30)),
            Some(SettingsChange::Wiring(Tiling::VerticalFlip)),
            Some(SettingsChange::Gain(35)),
            None,
            Some(SettingsChange::Gain(99)),
        ]
        .into_iter();

        let mut pending = PendingChanges::default();
        block_on(collect_until_quiet(&mut pending, || {
            let next = script.next().flatten();
            async move { next }
        }));

        let mut settings = Settings::new(20);
        pending.apply(&mut settings);
        assert_eq!(settings.gain, 35);
        assert_eq!(settings.tiling(), Some(Tiling::VerticalFlip));
        // The change after the quiet period belongs to the next write
        assert_eq!(script.next(), Some(Some(SettingsChange::Gain(99))));
    }
}
