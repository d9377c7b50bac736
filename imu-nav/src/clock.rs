//! Wall-clock sources used to time accepted frames.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the timestamp recorded with each accepted frame.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The host's wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// Useful for replaying captures at their nominal frame rate and for tests.
/// The first call to [`now`](Clock::now) returns `start`.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// Start at the Unix epoch
    pub fn from_epoch(step: Duration) -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH, step)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Seconds from `earlier` to `later`, negative if the clock went backwards.
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
