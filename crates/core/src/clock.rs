//! Wall-clock abstraction
//!
//! Every expiry decision reads "now" through [`Clock`] so tests can pin and
//! advance time without sleeping.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + 'static {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Current unix timestamp in whole seconds
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn unix_seconds(&self) -> i64 {
        (**self).unix_seconds()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same time, so a test can keep one handle and pass
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct MockClock {
    seconds: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a mock clock frozen at the given unix timestamp
    #[must_use]
    pub fn at(unix_seconds: i64) -> Self {
        Self { seconds: Arc::new(AtomicI64::new(unix_seconds)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        self.seconds.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move the clock back, e.g. to simulate skew between hosts
    pub fn rewind(&self, duration: Duration) {
        let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        self.seconds.fetch_sub(secs, Ordering::SeqCst);
    }

    /// Set the mock clock to a specific unix timestamp
    pub fn set(&self, unix_seconds: i64) {
        self.seconds.store(unix_seconds, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::at(Utc::now().timestamp())
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_seconds(), 0).unwrap_or_default()
    }

    fn unix_seconds(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::at(1_000);
        let handle = clock.clone();

        handle.advance(Duration::from_secs(61));
        assert_eq!(clock.unix_seconds(), 1_061);

        handle.rewind(Duration::from_secs(1));
        assert_eq!(clock.now().timestamp(), 1_060);
    }

    #[test]
    fn system_clock_tracks_utc_now() {
        let before = Utc::now().timestamp();
        let now = SystemClock.unix_seconds();
        assert!(now >= before);
    }
}
