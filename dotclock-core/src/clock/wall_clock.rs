//! Wall clock
//!
//! The board has no RTC. Civil time is an anchor (local date-time) plus the
//! milliseconds elapsed on the monotonic counter since the anchor was taken.
//! Setting the time or adjusting a field just moves the anchor.

use time::{Duration, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::state::SettingField;

/// Wall clock errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Timestamp outside the representable range
    InvalidTimestamp,
    /// UTC offset outside +-25 hours
    InvalidOffset,
}

/// Local time derived from a monotonic millisecond counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    anchor: PrimitiveDateTime,
    anchor_ms: u64,
    offset: UtcOffset,
}

impl WallClock {
    /// Create a clock reading the unix epoch (in local time) at `now_ms`
    pub fn new(utc_offset_minutes: i16, now_ms: u64) -> Result<Self, ClockError> {
        let offset = UtcOffset::from_whole_seconds(utc_offset_minutes as i32 * 60)
            .map_err(|_| ClockError::InvalidOffset)?;
        let epoch = OffsetDateTime::UNIX_EPOCH;
        Ok(Self {
            anchor: PrimitiveDateTime::new(epoch.date(), epoch.time()),
            anchor_ms: now_ms,
            offset,
        })
    }

    /// Set the clock from a unix timestamp (seconds, UTC)
    pub fn set_unix(&mut self, unix: i64, now_ms: u64) -> Result<(), ClockError> {
        let shifted = unix
            .checked_add(self.offset.whole_seconds() as i64)
            .ok_or(ClockError::InvalidTimestamp)?;
        let local = OffsetDateTime::from_unix_timestamp(shifted)
            .map_err(|_| ClockError::InvalidTimestamp)?;
        self.anchor = PrimitiveDateTime::new(local.date(), local.time());
        self.anchor_ms = now_ms;
        Ok(())
    }

    /// Local date-time at `now_ms`
    pub fn now(&self, now_ms: u64) -> PrimitiveDateTime {
        let elapsed = now_ms.saturating_sub(self.anchor_ms);
        let elapsed = i64::try_from(elapsed).unwrap_or(i64::MAX);
        self.anchor
            .checked_add(Duration::milliseconds(elapsed))
            .unwrap_or(self.anchor)
    }

    /// Unix timestamp (seconds, UTC) at `now_ms`
    pub fn unix(&self, now_ms: u64) -> i64 {
        self.now(now_ms).assume_offset(self.offset).unix_timestamp()
    }

    /// Shift one field of the current time by `delta`
    ///
    /// Minute, hour and day carry into the larger fields. Month and year
    /// keep the other fields, clamping the day to the target month's length.
    /// Out-of-range results leave the clock unchanged.
    pub fn adjust(&mut self, field: SettingField, delta: i8, now_ms: u64) {
        let current = self.now(now_ms);
        let delta = delta as i64;

        let adjusted = match field {
            SettingField::Minute => current.checked_add(Duration::minutes(delta)),
            SettingField::Hour => current.checked_add(Duration::hours(delta)),
            SettingField::Day => current.checked_add(Duration::days(delta)),
            SettingField::Month => {
                let month0 = u8::from(current.month()) as i64 - 1;
                let index = current.year() as i64 * 12 + month0 + delta;
                with_year_month(current, index.div_euclid(12), (index.rem_euclid(12) + 1) as u8)
            }
            SettingField::Year => {
                with_year_month(current, current.year() as i64 + delta, u8::from(current.month()))
            }
        };

        if let Some(adjusted) = adjusted {
            self.anchor = adjusted;
            self.anchor_ms = now_ms;
        }
    }
}

fn with_year_month(current: PrimitiveDateTime, year: i64, month: u8) -> Option<PrimitiveDateTime> {
    let year = i32::try_from(year).ok()?;
    let month = Month::try_from(month).ok()?;
    let day = current.day().min(time::util::days_in_year_month(year, month));
    let date = time::Date::from_calendar_date(year, month, day).ok()?;
    Some(PrimitiveDateTime::new(date, current.time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-31 23:59:30 UTC
    const JAN_31: i64 = 1_706_745_570;

    fn utc_clock(unix: i64) -> WallClock {
        let mut clock = WallClock::new(0, 0).unwrap();
        clock.set_unix(unix, 0).unwrap();
        clock
    }

    #[test]
    fn test_starts_at_epoch() {
        let clock = WallClock::new(0, 500).unwrap();
        assert_eq!(clock.unix(500), 0);
        assert_eq!(clock.unix(1500), 1);
    }

    #[test]
    fn test_time_advances_with_counter() {
        let clock = utc_clock(JAN_31);
        let later = clock.now(45_000);
        assert_eq!(later.month(), Month::February);
        assert_eq!(later.day(), 1);
        assert_eq!(later.hour(), 0);
        assert_eq!(later.second(), 15);
    }

    #[test]
    fn test_offset_applied() {
        let mut clock = WallClock::new(480, 0).unwrap();
        clock.set_unix(0, 0).unwrap();
        assert_eq!(clock.now(0).hour(), 8);
        assert_eq!(clock.unix(0), 0);
    }

    #[test]
    fn test_invalid_offset() {
        assert_eq!(WallClock::new(26 * 60, 0), Err(ClockError::InvalidOffset));
    }

    #[test]
    fn test_minute_carries() {
        let mut clock = utc_clock(JAN_31);
        clock.adjust(SettingField::Minute, 1, 0);
        let now = clock.now(0);
        assert_eq!((now.month(), now.day(), now.hour(), now.minute()), (Month::February, 1, 0, 0));
    }

    #[test]
    fn test_month_clamps_day() {
        let mut clock = utc_clock(JAN_31);
        clock.adjust(SettingField::Month, 1, 0);
        let now = clock.now(0);
        assert_eq!((now.year(), now.month(), now.day()), (2024, Month::February, 29));

        clock.adjust(SettingField::Year, 1, 0);
        let now = clock.now(0);
        assert_eq!((now.year(), now.month(), now.day()), (2025, Month::February, 28));
    }

    #[test]
    fn test_month_clamps_to_thirty_days() {
        let mut clock = utc_clock(JAN_31);
        clock.adjust(SettingField::Month, 2, 0);
        assert_eq!(clock.now(0).day(), 31);

        clock.adjust(SettingField::Month, 1, 0);
        let now = clock.now(0);
        assert_eq!((now.month(), now.day()), (Month::April, 30));
    }

    #[test]
    fn test_month_wraps_year() {
        let mut clock = utc_clock(JAN_31);
        clock.adjust(SettingField::Month, -1, 0);
        let now = clock.now(0);
        assert_eq!((now.year(), now.month(), now.day()), (2023, Month::December, 31));
        assert_eq!((now.hour(), now.minute(), now.second()), (23, 59, 30));
    }

    #[test]
    fn test_adjust_reanchors() {
        let mut clock = utc_clock(JAN_31);
        clock.adjust(SettingField::Hour, -1, 10_000);
        let now = clock.now(10_000);
        assert_eq!((now.day(), now.hour(), now.minute(), now.second()), (31, 22, 59, 40));
    }
}
