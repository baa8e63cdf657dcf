//! Settings persistence
//!
//! Loads and saves the persisted settings record (spectrum gain and wiring
//! name) to flash storage.

use defmt::*;

use dotclock_core::config::{DisplayConfig, Settings};
use dotclock_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use dotclock_hal_rp2040::FlashStorageTrait;

/// Maximum serialized settings size
const MAX_SETTINGS_SIZE: usize = 64;

/// Settings persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<FlashError> for SettingsError {
    fn from(e: FlashError) -> Self {
        SettingsError::Flash(e)
    }
}

/// Load settings from flash
///
/// Returns the stored settings, or fresh ones with the compiled gain and no
/// wiring choice if nothing valid is stored.
pub async fn load_settings(
    storage: &mut Rp2040FlashStorage<'_>,
    config: &DisplayConfig,
) -> Settings {
    match load_settings_inner(storage).await {
        Ok(settings) => {
            info!(
                "Loaded settings from flash: gain={}, wiring={}",
                settings.gain,
                settings.wiring.as_str()
            );
            settings
        }
        Err(SettingsError::Flash(FlashError::NotFound)) => {
            debug!("No settings in flash, using defaults");
            Settings::new(config.default_gain)
        }
        Err(e) => {
            warn!("Failed to load settings: {:?}, using defaults", e);
            Settings::new(config.default_gain)
        }
    }
}

/// Inner function that returns errors
async fn load_settings_inner(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<Settings, SettingsError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage.read(StorageKey::Settings, &mut buffer).await?;

    debug!("Read {} bytes of settings from flash", len);

    let settings: Settings =
        postcard::from_bytes(&buffer[..len]).map_err(|_| SettingsError::Deserialize)?;

    if !settings.is_valid() {
        return Err(SettingsError::InvalidFormat);
    }

    if !settings.verify_crc() {
        warn!("Settings CRC mismatch");
        return Err(SettingsError::CrcMismatch);
    }

    Ok(settings)
}

/// Save settings to flash
///
/// Updates the CRC before saving.
pub async fn save_settings(
    storage: &mut Rp2040FlashStorage<'_>,
    settings: &mut Settings,
) -> Result<(), SettingsError> {
    settings.update_crc();

    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes =
        postcard::to_slice(settings, &mut buffer).map_err(|_| SettingsError::Serialize)?;

    debug!("Saving {} bytes of settings to flash", bytes.len());

    storage.write(StorageKey::Settings, bytes).await?;

    info!(
        "Saved settings: gain={}, wiring={}",
        settings.gain,
        settings.wiring.as_str()
    );
    Ok(())
}
