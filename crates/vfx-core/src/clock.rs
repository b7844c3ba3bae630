//! Monotonic timestamp source.
//!
//! [`Ticks`] is the unit the timing ledger records; a [`Clock`] produces
//! them. [`MonotonicClock`] is the default and is backed by
//! [`std::time::Instant`]; [`ManualClock`] lets tests step time by hand.

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Monotonic timestamp in nanoseconds since an arbitrary epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    /// Zero ticks.
    pub const ZERO: Ticks = Ticks(0);

    /// Creates ticks from nanoseconds.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Creates ticks from milliseconds.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Nanoseconds.
    #[inline]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Converts to a [`Duration`].
    #[inline]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    /// Difference `self - earlier`, zero if `earlier` is later.
    #[inline]
    pub const fn saturating_since(&self, earlier: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(earlier.0))
    }
}

impl Add for Ticks {
    type Output = Ticks;

    fn add(self, rhs: Ticks) -> Ticks {
        Ticks(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Ticks {
    type Output = Ticks;

    fn sub(self, rhs: Ticks) -> Ticks {
        self.saturating_since(rhs)
    }
}

impl From<Duration> for Ticks {
    fn from(d: Duration) -> Self {
        Ticks(d.as_nanos().min(u64::MAX as u128) as u64)
    }
}

/// Source of monotonic timestamps.
pub trait Clock: Send + Sync + 'static {
    /// Current time.
    fn now(&self) -> Ticks;
}

/// Wall-independent clock counting from the first time any
/// `MonotonicClock` is read in this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

fn process_epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

impl Clock for MonotonicClock {
    fn now(&self) -> Ticks {
        Ticks::from(process_epoch().elapsed())
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock starting at `start`.
    pub fn new(start: Ticks) -> Self {
        Self {
            nanos: AtomicU64::new(start.0),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Ticks) {
        self.nanos.fetch_add(by.0, Ordering::SeqCst);
    }

    /// Sets the clock to `to`.
    pub fn set(&self, to: Ticks) {
        self.nanos.store(to.0, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        Ticks(self.nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_back() {
        let clock = MonotonicClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(Ticks::from_millis(5));
        clock.advance(Ticks::from_millis(3));
        assert_eq!(clock.now(), Ticks::from_millis(8));
        clock.set(Ticks::ZERO);
        assert_eq!(clock.now(), Ticks::ZERO);
    }

    #[test]
    fn test_saturating_arithmetic() {
        let early = Ticks(10);
        let late = Ticks(25);
        assert_eq!(late - early, Ticks(15));
        assert_eq!(early - late, Ticks::ZERO);
        assert_eq!(Ticks(u64::MAX) + Ticks(1), Ticks(u64::MAX));
    }
}
