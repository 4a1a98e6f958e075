//! Clock implementations for Petal

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use petal_core::MonoTime;

/// Source of monotonic session time
pub trait Clock {
    /// Current session time. MUST never go backwards.
    fn now(&self) -> MonoTime;
}

/// Real-time clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    /// Create a clock that reads zero now
    pub fn new() -> Self {
        Self {
            reference: Instant::now(),
        }
    }

    /// Create a clock anchored at an earlier instant
    pub fn anchored_at(reference: Instant) -> Self {
        Self { reference }
    }

    /// The OS instant that corresponds to a session time
    pub fn instant_at(&self, t: MonoTime) -> Instant {
        self.reference + t.as_duration()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> MonoTime {
        MonoTime::from_duration(self.reference.elapsed())
    }
}

/// Manually driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    value: Arc<Mutex<MonoTime>>,
}

impl ManualClock {
    /// Create a clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at a given time
    pub fn starting_at(t: MonoTime) -> Self {
        Self {
            value: Arc::new(Mutex::new(t)),
        }
    }

    /// Move time forward
    pub fn advance(&self, dt: Duration) -> MonoTime {
        let mut value = self.value.lock();
        *value = value.saturating_add(dt);
        *value
    }

    /// Jump to a time. Only moves forward.
    pub fn set(&self, t: MonoTime) -> MonoTime {
        let mut value = self.value.lock();
        if t > *value {
            *value = t;
        }
        *value
    }
}

impl Clock for ManualClock {
    fn now(&self) -> MonoTime {
        *self.value.lock()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> MonoTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> MonoTime {
        (**self).now()
    }
}
