//! Time primitives for Petal
//!
//! Every timestamp in the pipeline is a [`MonoTime`]: microseconds since the
//! session clock started. It only moves forward, which is what the reveal
//! deadlines rely on. Frame arrival is irregular; deadlines are not tied to it.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Monotonic session time, in microseconds since session start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MonoTime(pub u64);

impl MonoTime {
    pub const ZERO: MonoTime = MonoTime(0);
    pub const MAX: MonoTime = MonoTime(u64::MAX);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        MonoTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        MonoTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_duration(since_start: Duration) -> Self {
        MonoTime(since_start.as_micros().min(u64::MAX as u128) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let micros = duration.as_micros().min(u64::MAX as u128) as u64;
        MonoTime(self.0.saturating_add(micros))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn saturating_since(self, earlier: MonoTime) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for MonoTime {
    type Output = MonoTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<MonoTime> for MonoTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: MonoTime) -> Self::Output {
        self.saturating_since(rhs)
    }
}

impl std::fmt::Debug for MonoTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_time_units() {
        let t = MonoTime::from_millis(2000);
        assert_eq!(t.as_micros(), 2_000_000);
        assert_eq!(t.as_millis(), 2000);
        assert_eq!(t.as_duration(), Duration::from_secs(2));
    }

    #[test]
    fn test_mono_time_arithmetic() {
        let t1 = MonoTime::from_millis(100);
        let t2 = t1 + Duration::from_millis(10);

        assert!(t2 > t1);
        assert_eq!(t2 - t1, Duration::from_millis(10));
        // Subtraction never goes negative
        assert_eq!(t1 - t2, Duration::ZERO);
    }

    #[test]
    fn test_mono_time_saturates() {
        let t = MonoTime::MAX + Duration::from_secs(1);
        assert_eq!(t, MonoTime::MAX);
    }
}
