//! Fixed-duration step buckets retained in a bounded FIFO.
//!
//! The boundary check only runs when a step fires, so an interval with no
//! steps never produces a record: idle stretches show up as gaps between
//! record timestamps rather than as zero-filled entries.

use std::collections::VecDeque;

use crate::config::{HistoryCfg, MetricsCfg};

/// Activity accrued in one bucket. Values are deltas, not running totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalRecord {
    /// Timestamp of the step that closed the bucket.
    pub timestamp_ms: u64,
    pub steps: u32,
    pub distance_m: f64,
    pub calories: f64,
}

/// Append-only history with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct IntervalHistory {
    records: VecDeque<IntervalRecord>,
    capacity: usize,
}

impl IntervalHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, returning the evicted one when at capacity.
    pub fn push(&mut self, rec: IntervalRecord) -> Option<IntervalRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(rec);
        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntervalRecord> {
        self.records.iter()
    }

    /// Oldest-first copy.
    pub fn to_vec(&self) -> Vec<IntervalRecord> {
        self.records.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[derive(Debug, Clone)]
pub struct IntervalRecorder {
    interval_ms: u64,
    step_length_m: f64,
    calories_per_step: f64,
    interval_steps: u32,
    interval_start_ms: u64,
    history: IntervalHistory,
}

impl IntervalRecorder {
    pub fn new(cfg: &HistoryCfg, metrics: &MetricsCfg, start_ms: u64) -> Self {
        Self {
            interval_ms: cfg.interval_ms,
            step_length_m: metrics.step_length_m,
            calories_per_step: metrics.calories_per_step,
            interval_steps: 0,
            interval_start_ms: start_ms,
            history: IntervalHistory::with_capacity(cfg.capacity),
        }
    }

    /// Count a step and close the bucket when it has run for a full interval.
    /// Returns the record appended, if any.
    pub fn on_step(&mut self, now_ms: u64) -> Option<IntervalRecord> {
        self.interval_steps = self.interval_steps.saturating_add(1);
        if now_ms.saturating_sub(self.interval_start_ms) < self.interval_ms {
            return None;
        }
        let n = self.interval_steps;
        let rec = IntervalRecord {
            timestamp_ms: now_ms,
            steps: n,
            distance_m: f64::from(n) * self.step_length_m,
            calories: f64::from(n) * self.calories_per_step,
        };
        if let Some(old) = self.history.push(rec) {
            tracing::trace!(evicted_ms = old.timestamp_ms, "interval history full; evicted oldest");
        }
        self.interval_steps = 0;
        self.interval_start_ms = now_ms;
        Some(rec)
    }

    #[inline]
    pub fn history(&self) -> &IntervalHistory {
        &self.history
    }

    /// Steps counted in the still-open bucket.
    #[inline]
    pub fn pending_steps(&self) -> u32 {
        self.interval_steps
    }

    #[inline]
    pub fn interval_start_ms(&self) -> u64 {
        self.interval_start_ms
    }

    pub fn reset(&mut self, start_ms: u64) {
        self.interval_steps = 0;
        self.interval_start_ms = start_ms;
        self.history.clear();
    }
}
