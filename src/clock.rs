//! Injectable "now" provider for session timestamps.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time for `started_at` / `ended_at`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the session.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(at)),
        }
    }

    /// Clock fixed at 2023-11-14T22:13:20Z.
    pub fn fixed() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_700_000_000))
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whole seconds between two instants, never negative.
pub fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::fixed();
        let handle = clock.clone();
        let before = clock.now();

        handle.advance_secs(90);

        assert_eq!(whole_seconds_between(before, clock.now()), 90);
    }

    #[test]
    fn test_whole_seconds_truncates_and_clamps() {
        let start = ManualClock::fixed().now();
        assert_eq!(whole_seconds_between(start, start + Duration::milliseconds(1999)), 1);
        assert_eq!(whole_seconds_between(start + Duration::seconds(5), start), 0);
    }
}
