//! Settings partition on the RP2040's QSPI flash
//!
//! The last 64 KiB of the 2 MiB flash are left out of `FLASH` in memory.x
//! and hold a sequential-storage map keyed by [`StorageKey`]. The map does
//! the wear leveling; records are small and written rarely.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use dotclock_hal::flash::{FlashError, StorageKey};

/// Flash on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Bytes at the end of flash given to settings; memory.x must agree
pub const SETTINGS_PARTITION_SIZE: usize = 64 * 1024;

/// Offsets of the settings partition within flash
pub const SETTINGS_RANGE: Range<u32> =
    (FLASH_SIZE - SETTINGS_PARTITION_SIZE) as u32..FLASH_SIZE as u32;

/// Scratch space for one map entry (key, length and record)
const ENTRY_BUFFER_SIZE: usize = 128;

/// Settings storage on the onboard flash
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    scratch: [u8; ENTRY_BUFFER_SIZE],
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            scratch: [0; ENTRY_BUFFER_SIZE],
        }
    }
}

impl<'d> dotclock_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let record = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut self.scratch,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)?
        .ok_or(FlashError::NotFound)?;

        let dest = buffer
            .get_mut(..record.len())
            .ok_or(FlashError::BufferTooSmall)?;
        dest.copy_from_slice(record);
        Ok(record.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut self.scratch,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_rp::flash::ERASE_SIZE;

    #[test]
    fn test_partition_is_sector_aligned() {
        assert_eq!(SETTINGS_RANGE.start as usize % ERASE_SIZE, 0);
        assert_eq!(SETTINGS_RANGE.end as usize, FLASH_SIZE);
        assert_eq!(
            (SETTINGS_RANGE.end - SETTINGS_RANGE.start) as usize,
            SETTINGS_PARTITION_SIZE
        );
    }

    #[test]
    fn test_partition_holds_several_sectors() {
        // The map needs at least two sectors to rotate through
        assert!(SETTINGS_PARTITION_SIZE / ERASE_SIZE >= 2);
    }
}
