//! Injectable time source.
//!
//! The repository never reads the system clock directly. Version ids and
//! audit timestamps come from a [`Clock`] handed to it at construction, so
//! tests can pin time with [`ManualClock`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and replays.
///
/// Returns a fixed instant, optionally advancing by `step` after every
/// reading so consecutive calls yield strictly increasing values.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    /// A clock frozen at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self::stepping(at, Duration::zero())
    }

    /// A clock starting at `at` that advances by `step` after each reading.
    pub fn stepping(at: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Mutex::new(at),
            step,
        }
    }

    // The guarded instant is always whole, so a poisoned lock stays usable.
    fn current(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the clock to an explicit instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.current() = at;
    }

    /// Advance the clock by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current();
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.current();
        let now = *current;
        *current += self.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 1, 2, 3).unwrap()
    }

    #[test]
    fn frozen_clock_repeats() {
        let clock = ManualClock::new(t0());
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn stepping_clock_advances_per_reading() {
        let clock = ManualClock::stepping(t0(), Duration::seconds(1));
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0() + Duration::seconds(1));
    }

    #[test]
    fn set_and_advance() {
        let clock = ManualClock::new(t0());
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), t0() + Duration::minutes(5));
        clock.set(t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn poisoned_clock_keeps_ticking() {
        let clock = std::sync::Arc::new(ManualClock::stepping(t0(), Duration::seconds(1)));
        let poisoner = std::sync::Arc::clone(&clock);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.current.lock().unwrap();
            panic!("poison the clock");
        })
        .join();
        assert!(result.is_err());
        assert!(clock.current.is_poisoned());

        assert_eq!(clock.now(), t0());
        clock.advance(Duration::minutes(1));
        assert_eq!(clock.now(), t0() + Duration::seconds(1) + Duration::minutes(1));
    }

    #[test]
    fn system_clock_is_recent() {
        // After 2020-01-01.
        assert!(SystemClock.now().timestamp() > 1_577_836_800);
    }
}
