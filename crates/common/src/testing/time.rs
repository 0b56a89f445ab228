//! Wall-clock abstraction for deterministic tests.
//!
//! The booking domain works in naive local time (no time-zone conversion),
//! so the clock hands out `chrono::NaiveDateTime` rather than `Instant`.
//! Production code uses [`SystemClock`]; tests pin time with [`MockClock`].

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use parking_lot::Mutex;

/// Source of "now" for time-dependent business rules.
pub trait Clock: Send + Sync {
    /// Current wall-clock time as a naive local timestamp.
    fn now(&self) -> NaiveDateTime;
}

/// Real system clock. Use in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Create a mock clock pinned at the given timestamp.
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }

    /// Pin the clock to an absolute timestamp.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
