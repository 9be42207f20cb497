//! Throttled, point-in-time views of the accumulated metrics.

use crate::history::{IntervalHistory, IntervalRecord};
use crate::metrics::Accumulators;
use crate::util::{round_count, round2};

/// Consumer-facing copy of the engine state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// When the copy was taken (ms since session epoch).
    pub published_at_ms: u64,
    pub steps: u64,
    /// Rounded to two decimals.
    pub distance_m: f64,
    /// Rounded to the nearest whole calorie.
    pub calories: u64,
    /// Rounded opaque activity score.
    pub active_time_units: u64,
    /// Oldest first.
    pub interval_history: Vec<IntervalRecord>,
}

impl Snapshot {
    pub fn capture(now_ms: u64, totals: &Accumulators, history: &IntervalHistory) -> Self {
        Self {
            published_at_ms: now_ms,
            steps: totals.steps,
            distance_m: round2(totals.distance_m),
            calories: round_count(totals.calories),
            active_time_units: round_count(totals.active_time_units),
            interval_history: history.to_vec(),
        }
    }
}

/// Fixed-cadence publication schedule plus the last published copy.
///
/// The schedule is independent of interval bucketing; both default to 5 s but
/// their phases are not aligned.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    interval_ms: u64,
    /// `None` once the next boundary would pass `u64::MAX`.
    next_due_ms: Option<u64>,
    latest: Option<Snapshot>,
    published: u64,
}

impl SnapshotPublisher {
    pub fn new(interval_ms: u64, start_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            next_due_ms: start_ms.checked_add(interval_ms),
            latest: None,
            published: 0,
        }
    }

    #[inline]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_due_ms.is_some_and(|due| now_ms >= due)
    }

    /// Store `snap` as the latest publication and schedule the next one.
    ///
    /// When the caller fell behind by several periods the schedule skips
    /// ahead instead of bursting catch-up publications.
    pub fn publish(&mut self, snap: Snapshot) -> &Snapshot {
        let now = snap.published_at_ms;
        if let Some(due) = self.next_due_ms.filter(|&due| due <= now) {
            let periods = (now - due) / self.interval_ms + 1;
            self.next_due_ms = periods
                .checked_mul(self.interval_ms)
                .and_then(|skip| due.checked_add(skip));
        }
        self.published = self.published.saturating_add(1);
        self.latest.insert(snap)
    }

    #[inline]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    #[inline]
    pub fn published_count(&self) -> u64 {
        self.published
    }

    #[inline]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    pub fn reset(&mut self, start_ms: u64) {
        self.next_due_ms = start_ms.checked_add(self.interval_ms);
        self.latest = None;
        self.published = 0;
    }
}
