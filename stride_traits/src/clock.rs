use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source shared by the sampler, the engine runner and tests.
///
/// Sample timestamps are milliseconds since an epoch `Instant` taken when a
/// session starts, so every time-based rule in the engine works on wall-clock
/// deltas rather than sample counts.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let ms = self.now().saturating_duration_since(epoch).as_millis();
        ms.min(u128::from(u64::MAX)) as u64
    }
}

/// Real-time clock backed by `std::time::Instant`.
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

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic clock for tests: `sleep` advances virtual time instantly.
    ///
    /// Clones share the same timeline, so a sampler thread and the test body
    /// observe the same `now()`.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset_us: Arc<AtomicU64>,
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
                offset_us: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Advance the clock by `d`.
        pub fn advance(&self, d: Duration) {
            let us = d.as_micros().min(u128::from(u64::MAX)) as u64;
            self.offset_us.fetch_add(us, Ordering::SeqCst);
        }

        /// Virtual milliseconds elapsed since construction.
        pub fn elapsed_ms(&self) -> u64 {
            self.offset_us.load(Ordering::SeqCst) / 1_000
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}
