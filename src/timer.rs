//! Millisecond timers driven by an injectable monotonic clock
//!
//! Every "wait" in the game (animation pacing, battle dwell times, credit pages)
//! is a [`Timer`] polled once per tick. Nothing sleeps or blocks.
//!
//! The clock is a trait so tests can advance time by hand with [`ManualClock`]
//! instead of sleeping.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonic milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`Instant`], counted from construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying time, so a test can keep one handle and hand
/// the other to the game context.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Answers "done" once more than `duration_ms` has elapsed since the last reset.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    duration_ms: u64,
    start_ms: u64,
}

impl Timer {
    pub fn new(duration_ms: u64, now_ms: u64) -> Self {
        Timer {
            duration_ms,
            start_ms: now_ms,
        }
    }

    /// Elapsed time strictly exceeds the default duration.
    pub fn done(&self, now_ms: u64) -> bool {
        self.elapsed(now_ms) > self.duration_ms
    }

    /// Same as [`Timer::done`] with a one-off target instead of the default.
    pub fn done_after(&self, target_ms: u64, now_ms: u64) -> bool {
        self.elapsed(now_ms) > target_ms
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
    }

    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}
