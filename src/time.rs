//! Wall-clock sources and the frontend poll throttle.
//!
//! The core never reads the system time directly. Stores ask a [`Clock`] for
//! "now", so tests can swap in a [`ManualClock`] and jump hours ahead without
//! sleeping.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock. On wasm32 chrono reads `Date.now()` through js-sys.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Convenience for the common "wait N hours" case. Fractions are kept to
    /// millisecond precision.
    pub fn advance_hours(&self, hours: f64) {
        self.advance(Duration::milliseconds((hours * MS_PER_HOUR) as i64));
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Hours between two instants. Negative if `to` is before `from`.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Turns per-frame timestamps into "is a poll due" decisions.
///
/// `draw_web()` runs at ~60fps, but timer status only needs refreshing once
/// per interval. Leftover time carries over between frames.
pub struct PollThrottle {
    interval_ms: f64,
    accumulator: f64,
    last_timestamp: Option<f64>,
    /// Total polls fired since creation.
    pub total_polls: u64,
}

impl PollThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            accumulator: 0.0,
            last_timestamp: None,
            total_polls: 0,
        }
    }

    /// Feed a frame timestamp (ms, e.g. `performance.now()`).
    /// Returns true when at least one interval has passed since the last poll.
    /// The first frame always polls so the view is populated immediately.
    pub fn update(&mut self, now_ms: f64) -> bool {
        let delta = match self.last_timestamp {
            // Backgrounded tabs can deliver huge deltas; one poll covers them.
            Some(prev) => (now_ms - prev).clamp(0.0, self.interval_ms),
            None => {
                self.last_timestamp = Some(now_ms);
                self.total_polls += 1;
                return true;
            }
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        if self.accumulator >= self.interval_ms {
            self.accumulator -= self.interval_ms;
            self.total_polls += 1;
            true
        } else {
            false
        }
    }
}
