//! Clock implementations for the monitor timeline

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use studylens_core::Timestamp;

/// Source of monitor time
pub trait Clock: Send + Sync {
    /// Current time on the monitor timeline
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by the OS clock
/// INVARIANT: never goes backwards
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    reference: Instant,
}

impl MonotonicClock {
    /// Create a clock reading zero now
    pub fn new() -> Self {
        MonotonicClock {
            reference: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.reference.elapsed().as_millis();
        Timestamp::from_millis(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    value: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            value: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance by a duration, returning the new time
    pub fn advance(&self, dt: Duration) -> Timestamp {
        let mut value = self.value.lock();
        *value = *value + dt;
        *value
    }

    /// Jump to a specific time (only forward)
    pub fn set(&self, target: Timestamp) {
        let mut value = self.value.lock();
        if target > *value {
            *value = target;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.value.lock()
    }
}
