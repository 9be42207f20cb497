//! The owned step engine (`StrideEngine`).
//!
//! One struct holds every piece of per-session state: gravity estimate,
//! detector (threshold, debounce, smoothing window), accumulators, interval
//! history and the snapshot schedule. All mutation goes through `ingest` and
//! `publish*`, which makes the engine deterministic for a given sample
//! sequence and trivially restartable via `begin`.

use stride_traits::Acceleration;

use crate::config::EngineCfg;
use crate::detector::{Detection, StepDetector};
use crate::gravity::{GravityEstimate, GravityEstimator};
use crate::history::{IntervalHistory, IntervalRecorder};
use crate::metrics::{Accumulators, MetricsAccumulator};
use crate::motion::{MotionComponents, decompose};
use crate::snapshot::{Snapshot, SnapshotPublisher};
use crate::status::{IngestOutcome, RejectReason, StepEvent};

/// One timestamped accelerometer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Milliseconds since the session epoch.
    pub timestamp_ms: u64,
    pub accel: Acceleration,
}

impl RawSample {
    #[inline]
    pub const fn new(timestamp_ms: u64, ax: f64, ay: f64, az: f64) -> Self {
        Self {
            timestamp_ms,
            accel: Acceleration::new(ax, ay, az),
        }
    }
}

/// Sample-level counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected_non_finite: u64,
    pub rejected_over_limit: u64,
    pub first_step_ms: Option<u64>,
    pub last_step_ms: Option<u64>,
}

impl IngestStats {
    /// Every sample offered to `ingest`, rejected ones included.
    pub fn samples(&self) -> u64 {
        self.accepted
            .saturating_add(self.rejected_non_finite)
            .saturating_add(self.rejected_over_limit)
    }
}

pub struct StrideEngine {
    cfg: EngineCfg,
    gravity: GravityEstimator,
    detector: StepDetector,
    metrics: MetricsAccumulator,
    recorder: IntervalRecorder,
    publisher: SnapshotPublisher,
    started_at_ms: u64,
    last_sample_ms: Option<u64>,
    last_motion: MotionComponents,
    stats: IngestStats,
}

impl core::fmt::Debug for StrideEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StrideEngine")
            .field("steps", &self.metrics.totals().steps)
            .field("threshold", &self.detector.threshold())
            .field("history_len", &self.recorder.history().len())
            .field("last_sample_ms", &self.last_sample_ms)
            .finish()
    }
}

impl StrideEngine {
    /// Start building an engine with validated configuration.
    pub fn builder() -> crate::builder::EngineBuilder {
        crate::builder::EngineBuilder::default()
    }

    /// Construct without validation; prefer `builder()`.
    pub(crate) fn from_cfg(cfg: EngineCfg, start_ms: u64) -> Self {
        Self {
            gravity: GravityEstimator::new(cfg.gravity.alpha),
            detector: StepDetector::new(cfg.detector.clone()),
            metrics: MetricsAccumulator::new(cfg.metrics.clone()),
            recorder: IntervalRecorder::new(&cfg.history, &cfg.metrics, start_ms),
            publisher: SnapshotPublisher::new(cfg.publish.interval_ms, start_ms),
            started_at_ms: start_ms,
            last_sample_ms: None,
            last_motion: MotionComponents::default(),
            stats: IngestStats::default(),
            cfg,
        }
    }

    /// Reset all per-session state. `now_ms` becomes the start of the first
    /// interval bucket and the base of the publish schedule.
    pub fn begin(&mut self, now_ms: u64) {
        self.gravity.reset();
        self.detector.reset();
        self.metrics.reset();
        self.recorder.reset(now_ms);
        self.publisher.reset(now_ms);
        self.started_at_ms = now_ms;
        self.last_sample_ms = None;
        self.last_motion = MotionComponents::default();
        self.stats = IngestStats::default();
    }

    /// Process one sample synchronously in O(window) time.
    ///
    /// Non-finite samples are dropped before any state is touched. Samples
    /// above the shake limit still feed the gravity filter but leave the
    /// detector and all accumulators unchanged.
    pub fn ingest(&mut self, sample: &RawSample) -> IngestOutcome {
        if !sample.accel.is_finite() {
            self.stats.rejected_non_finite = self.stats.rejected_non_finite.saturating_add(1);
            tracing::trace!(t_ms = sample.timestamp_ms, "non-finite sample dropped");
            return IngestOutcome::Rejected(RejectReason::NonFinite);
        }

        let now = sample.timestamp_ms;
        self.last_sample_ms = Some(now);
        let g = self.gravity.update(&sample.accel);
        let m = decompose(&sample.accel, &g);
        self.last_motion = m;

        match self.detector.update(now, &m) {
            Detection::Discarded => {
                self.stats.rejected_over_limit = self.stats.rejected_over_limit.saturating_add(1);
                tracing::trace!(t_ms = now, total = m.total, "over-limit sample discarded");
                IngestOutcome::Rejected(RejectReason::OverLimit)
            }
            Detection::NoStep => {
                self.stats.accepted = self.stats.accepted.saturating_add(1);
                IngestOutcome::Idle
            }
            Detection::Step => {
                self.stats.accepted = self.stats.accepted.saturating_add(1);
                if self.stats.first_step_ms.is_none() {
                    self.stats.first_step_ms = Some(now);
                }
                self.stats.last_step_ms = Some(now);
                let totals = self.metrics.record_step();
                if let Some(rec) = self.recorder.on_step(now) {
                    tracing::debug!(
                        t_ms = now,
                        interval_steps = rec.steps,
                        history_len = self.recorder.history().len(),
                        "interval recorded"
                    );
                }
                tracing::debug!(
                    t_ms = now,
                    steps = totals.steps,
                    threshold = self.detector.threshold(),
                    "step"
                );
                IngestOutcome::Step(StepEvent {
                    timestamp_ms: now,
                    total_steps: totals.steps,
                })
            }
        }
    }

    /// Live point-in-time copy at `now_ms` (does not touch the publish schedule).
    pub fn snapshot_at(&self, now_ms: u64) -> Snapshot {
        Snapshot::capture(now_ms, &self.metrics.totals(), self.recorder.history())
    }

    /// Live copy stamped with the most recent sample time.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(self.last_sample_ms.unwrap_or(self.started_at_ms))
    }

    /// Publish unconditionally and return the published copy.
    pub fn publish(&mut self, now_ms: u64) -> Snapshot {
        let snap = self.snapshot_at(now_ms);
        let published = self.publisher.publish(snap).clone();
        tracing::debug!(
            t_ms = now_ms,
            steps = published.steps,
            history_len = published.interval_history.len(),
            "snapshot published"
        );
        published
    }

    /// Publish when the cadence says so; for single-threaded drivers that
    /// advance time through sample timestamps.
    pub fn publish_if_due(&mut self, now_ms: u64) -> Option<Snapshot> {
        if self.publisher.is_due(now_ms) {
            Some(self.publish(now_ms))
        } else {
            None
        }
    }

    /// Most recent published snapshot, if any.
    pub fn latest_published(&self) -> Option<&Snapshot> {
        self.publisher.latest()
    }

    pub fn published_count(&self) -> u64 {
        self.publisher.published_count()
    }

    pub fn totals(&self) -> Accumulators {
        self.metrics.totals()
    }

    pub fn history(&self) -> &IntervalHistory {
        self.recorder.history()
    }

    pub fn threshold(&self) -> f64 {
        self.detector.threshold()
    }

    pub fn gravity(&self) -> GravityEstimate {
        self.gravity.estimate()
    }

    pub fn smoothed_magnitude(&self) -> f64 {
        self.detector.smoothed()
    }

    pub fn last_motion(&self) -> MotionComponents {
        self.last_motion
    }

    pub fn last_step_ms(&self) -> Option<u64> {
        self.detector.last_step_ms()
    }

    pub fn last_sample_ms(&self) -> Option<u64> {
        self.last_sample_ms
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn cfg(&self) -> &EngineCfg {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> StrideEngine {
        StrideEngine::from_cfg(EngineCfg::default(), 0)
    }

    #[test]
    fn non_finite_sample_mutates_nothing() {
        let mut e = engine();
        e.ingest(&RawSample::new(0, 0.0, 0.0, 1.0));
        let g = e.gravity();
        let thr = e.threshold();
        let smoothed = e.smoothed_magnitude();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let out = e.ingest(&RawSample::new(20, bad, 0.0, 1.0));
            assert_eq!(out, IngestOutcome::Rejected(RejectReason::NonFinite));
        }
        assert_eq!(e.gravity(), g);
        assert_eq!(e.threshold(), thr);
        assert_eq!(e.smoothed_magnitude(), smoothed);
        assert_eq!(e.last_sample_ms(), Some(0));
        assert_eq!(e.stats().rejected_non_finite, 3);
    }

    #[test]
    fn begin_resets_session() {
        let mut e = engine();
        for i in 0..10 {
            e.ingest(&RawSample::new(i * 20, 1.0, 0.0, 0.0));
        }
        e.publish(200);
        e.begin(10_000);
        assert_eq!(e.totals(), Accumulators::default());
        assert_eq!(e.gravity(), GravityEstimate::default());
        assert!(e.latest_published().is_none());
        assert_eq!(e.started_at_ms(), 10_000);
        assert_eq!(e.stats(), IngestStats::default());
        assert!(e.publish_if_due(14_999).is_none());
        assert!(e.publish_if_due(15_000).is_some());
    }

    #[test]
    fn publish_if_due_handles_extreme_timestamps() {
        let mut e = engine();
        let far = 1_000_000_000_000_000;
        assert!(e.publish_if_due(far).is_some());
        assert!(e.publish_if_due(far + 4_999).is_none());
        assert!(e.publish_if_due(far + 5_000).is_some());

        assert!(e.publish_if_due(u64::MAX).is_some());
        assert!(e.publish_if_due(u64::MAX).is_none());
        assert_eq!(e.published_count(), 3);
    }
    #[test]
    fn stats_track_step_timestamps() {
        // alpha 1 pins gravity at zero so every sample counts as horizontal
        let mut e = StrideEngine::from_cfg(
            EngineCfg {
                gravity: crate::config::GravityCfg { alpha: 1.0 },
                detector: crate::config::DetectorCfg {
                    window: 1,
                    ..crate::config::DetectorCfg::default()
                },
                ..EngineCfg::default()
            },
            0,
        );
        e.ingest(&RawSample::new(0, 0.0, 0.0, 0.5));
        e.ingest(&RawSample::new(20, f64::NAN, 0.0, 1.0));
        e.ingest(&RawSample::new(40, 1.2, 0.0, 1.0));
        e.ingest(&RawSample::new(3_000, 1.2, 0.0, 1.0));
        let stats = e.stats();
        assert_eq!(stats.samples(), 4);
        assert_eq!(stats.first_step_ms, Some(40));
        assert_eq!(stats.last_step_ms, Some(3_000));
    }
}
