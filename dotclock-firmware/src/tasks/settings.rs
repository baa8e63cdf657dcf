//! Settings persistence task
//!
//! Owns the flash storage. Changes reported by the render loop are merged
//! until the buttons have been quiet for a while, then written once.

use defmt::*;
use embassy_time::{with_timeout, Duration};

use dotclock_core::config::{collect_until_quiet, PendingChanges, Settings};
use dotclock_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::SETTINGS_CHANGES;
use crate::config::save_settings;

/// Quiet period after the last change before writing
const SETTLE_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn settings_task(mut storage: Rp2040FlashStorage<'static>, mut settings: Settings) {
    info!("Settings task started");

    loop {
        let mut pending = PendingChanges::default();
        pending.record(SETTINGS_CHANGES.receive().await);

        collect_until_quiet(&mut pending, || async {
            with_timeout(Duration::from_millis(SETTLE_MS), SETTINGS_CHANGES.receive())
                .await
                .ok()
        })
        .await;

        if !pending.apply(&mut settings) {
            trace!("Settings unchanged, skipping write");
            continue;
        }

        if let Err(e) = save_settings(&mut storage, &mut settings).await {
            error!("Failed to save settings: {:?}", e);
        }
    }
}
