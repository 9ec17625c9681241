use std::thread;
use std::time::{Duration, Instant};

/// Time source for the monitor's cadence and retry pauses.
///
/// Every suspension in the control loop goes through `sleep`, so a test clock
/// can make a day of monitoring run in microseconds.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Time elapsed since `epoch`, zero if `epoch` is in the future.
    fn since(&self, epoch: Instant) -> Duration {
        self.now().saturating_duration_since(epoch)
    }
}

/// Wall-time clock backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Virtual clock: `sleep` advances time instantly and records the pause.
    ///
    /// Clones share the same timeline, so a test can keep one handle while the
    /// monitor owns another.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        inner: Arc<Mutex<Timeline>>,
    }

    #[derive(Debug, Default)]
    struct Timeline {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                inner: Arc::new(Mutex::new(Timeline::default())),
            }
        }

        /// Move time forward without recording a sleep.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut t) = self.inner.lock() {
                t.offset = t.offset.saturating_add(d);
            }
        }

        /// Every pause requested through `sleep`, in order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.inner
                .lock()
                .map(|t| t.sleeps.clone())
                .unwrap_or_default()
        }

        /// Sum of all recorded sleeps.
        pub fn total_slept(&self) -> Duration {
            self.sleeps().iter().sum()
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.inner.lock().map(|t| t.offset).unwrap_or_default();
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut t) = self.inner.lock() {
                t.offset = t.offset.saturating_add(d);
                t.sleeps.push(d);
            }
        }
    }

}
