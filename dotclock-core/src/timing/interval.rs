//! Interval timers for animation pacing
//!
//! A timer remembers when it last fired. Polling it from the render loop
//! fires at most once per interval; a late poll delays the next period
//! instead of producing catch-up bursts.

/// "Last fired + interval" timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalTimer {
    interval_ms: u32,
    last_ms: Option<u64>,
}

impl IntervalTimer {
    /// Create a timer whose first poll fires
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Configured interval
    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Returns true if the interval elapsed since the last firing
    ///
    /// On firing the timer re-anchors on `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms as u64,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    /// Poll and run `f` when the timer fires
    pub fn poll_then<F: FnOnce()>(&mut self, now_ms: u64, f: F) -> bool {
        let fired = self.poll(now_ms);
        if fired {
            f();
        }
        fired
    }

    /// Forget the last firing; the next poll fires
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// On/off phase toggled by an [`IntervalTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blinker {
    timer: IntervalTimer,
    on: bool,
}

impl Blinker {
    /// Create a blinker; the first poll switches it on
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            timer: IntervalTimer::new(interval_ms),
            on: false,
        }
    }

    /// Advance the phase if due and return it
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.timer.poll(now_ms) {
            self.on = !self.on;
        }
        self.on
    }

    /// Current phase without advancing
    pub const fn is_on(&self) -> bool {
        self.on
    }
}
