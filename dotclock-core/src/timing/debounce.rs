//! Interrupt-safe button debouncing
//!
//! State lives in a fixed array of atomics indexed by input id, so the
//! check can run from edge handlers through a shared `&'static` reference.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Default guard interval between accepted edges
pub const DEFAULT_GUARD_MS: u32 = 100;

/// Per-input edge debouncer
///
/// An edge is accepted only if at least the guard interval elapsed since
/// the last accepted edge of the same input. Rejected edges are dropped.
pub struct Debouncer<const N: usize> {
    guard_ms: u32,
    last_ms: [AtomicU32; N],
    armed: [AtomicBool; N],
}

impl<const N: usize> Debouncer<N> {
    /// Create a debouncer, usable in a `static`
    pub const fn new(guard_ms: u32) -> Self {
        Self {
            guard_ms,
            last_ms: [const { AtomicU32::new(0) }; N],
            armed: [const { AtomicBool::new(false) }; N],
        }
    }

    /// Guard interval in milliseconds
    pub const fn guard_ms(&self) -> u32 {
        self.guard_ms
    }

    /// Decide whether an edge of `input` at `now_ms` counts as a press
    ///
    /// `now_ms` is a wrapping 32-bit millisecond counter. Unknown inputs are
    /// rejected.
    pub fn accept(&self, input: usize, now_ms: u32) -> bool {
        let (Some(last), Some(armed)) = (self.last_ms.get(input), self.armed.get(input)) else {
            return false;
        };

        if armed.load(Ordering::Acquire)
            && now_ms.wrapping_sub(last.load(Ordering::Acquire)) < self.guard_ms
        {
            return false;
        }

        last.store(now_ms, Ordering::Release);
        armed.store(true, Ordering::Release);
        true
    }

    /// Forget all accepted edges
    pub fn reset(&self) {
        for armed in &self.armed {
            armed.store(false, Ordering::Release);
        }
    }
}
