use proptest::prelude::*;
use rstest::rstest;
use stride_core::history::IntervalHistory;
use stride_core::metrics::MetricsAccumulator;
use stride_core::{
    HistoryCfg, IngestOutcome, IntervalRecord, MetricsCfg, RawSample, RejectReason, Snapshot,
    StrideEngine,
};
use stride_sensors::{GaitProfile, SimulatedBounce};

fn run_trace(engine: &mut StrideEngine, trace: &[(u64, stride_traits::Acceleration)]) -> Vec<u64> {
    let mut steps = Vec::new();
    for (t, a) in trace {
        let out = engine.ingest(&RawSample {
            timestamp_ms: *t,
            accel: *a,
        });
        if let Some(ev) = out.step() {
            steps.push(ev.timestamp_ms);
        }
        engine.publish_if_due(*t);
    }
    steps
}

#[test]
fn gait_bursts_are_counted_with_debounce() {
    let mut e = StrideEngine::builder().build().expect("defaults");
    let steps = run_trace(&mut e, &GaitProfile::default().trace(30_000));

    assert_eq!(steps.len(), 10, "steps at {steps:?}");
    for w in steps.windows(2) {
        assert!(w[1] - w[0] > 2500, "too close: {w:?}");
    }
    let totals = e.totals();
    assert_eq!(totals.steps, 10);
    assert!((totals.distance_m - 5.0).abs() < 1e-9);

    // publications at 5 s, 10 s, ... 25 s
    assert_eq!(e.published_count(), 5);
    let latest = e.latest_published().expect("published");
    assert_eq!(latest.published_at_ms, 25_000);

    let hist = e.history().to_vec();
    assert!(!hist.is_empty());
    assert!(hist.iter().all(|r| r.steps > 0));
    assert!(hist.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    let recorded: u32 = hist.iter().map(|r| r.steps).sum();
    assert!(u64::from(recorded) <= totals.steps);
}

#[test]
fn pure_vertical_oscillation_yields_no_steps() {
    let mut e = StrideEngine::builder().build().expect("defaults");
    let bounce = SimulatedBounce::new(50, 1000.0, 0.8);
    for i in 0..1500u64 {
        let out = e.ingest(&RawSample {
            timestamp_ms: i * 20,
            accel: bounce.accel_at(i),
        });
        assert!(out.step().is_none(), "step at sample {i}");
    }
    assert_eq!(e.totals().steps, 0);
    assert!(e.history().is_empty());
}

#[test]
fn fresh_engine_publishes_empty_snapshot_after_five_seconds() {
    let mut e = StrideEngine::builder().build().expect("defaults");
    let mut published: Option<Snapshot> = None;
    for t in (0..=5000u64).step_by(20) {
        e.ingest(&RawSample::new(t, 0.0, 0.0, 1.0));
        if let Some(s) = e.publish_if_due(t) {
            published = Some(s);
        }
    }
    let snap = published.expect("published at 5000 ms");
    assert_eq!(snap.published_at_ms, 5000);
    assert_eq!(snap.steps, 0);
    assert_eq!(snap.distance_m, 0.0);
    assert_eq!(snap.calories, 0);
    assert!(snap.interval_history.is_empty());
}

#[rstest]
#[case::nan_x(f64::NAN, 0.0, 1.0)]
#[case::inf_y(0.0, f64::INFINITY, 1.0)]
#[case::neg_inf_z(0.0, 0.0, f64::NEG_INFINITY)]
fn non_finite_samples_are_dropped_without_side_effects(
    #[case] ax: f64,
    #[case] ay: f64,
    #[case] az: f64,
) {
    let mut e = StrideEngine::builder().build().expect("defaults");
    let trace = GaitProfile::default().trace(1100);
    run_trace(&mut e, &trace);
    let (g, thr, smoothed, last) = (
        e.gravity(),
        e.threshold(),
        e.smoothed_magnitude(),
        e.last_sample_ms(),
    );

    let out = e.ingest(&RawSample::new(1100, ax, ay, az));
    assert_eq!(out, IngestOutcome::Rejected(RejectReason::NonFinite));
    assert_eq!(e.gravity(), g);
    assert_eq!(e.threshold(), thr);
    assert_eq!(e.smoothed_magnitude(), smoothed);
    assert_eq!(e.last_sample_ms(), last);
    assert_eq!(e.stats().rejected_non_finite, 1);
}

#[test]
fn over_limit_sample_updates_gravity_only() {
    let mut e = StrideEngine::builder().build().expect("defaults");
    for t in (0..2000u64).step_by(20) {
        e.ingest(&RawSample::new(t, 0.0, 0.0, 1.0));
    }
    let (g, thr, smoothed) = (e.gravity(), e.threshold(), e.smoothed_magnitude());
    let out = e.ingest(&RawSample::new(2000, 6.0, 0.0, 1.0));
    assert_eq!(out, IngestOutcome::Rejected(RejectReason::OverLimit));
    assert_ne!(e.gravity(), g);
    assert_eq!(e.threshold(), thr);
    assert_eq!(e.smoothed_magnitude(), smoothed);
    assert_eq!(e.totals().steps, 0);
}

#[test]
fn small_history_keeps_only_the_newest_records() {
    let mut e = StrideEngine::builder()
        .with_history(HistoryCfg {
            interval_ms: 1,
            capacity: 3,
        })
        .build()
        .expect("valid");
    let steps = run_trace(&mut e, &GaitProfile::default().trace(30_000));
    assert_eq!(steps.len(), 10);

    let ts: Vec<u64> = e.history().iter().map(|r| r.timestamp_ms).collect();
    assert_eq!(ts, steps[steps.len() - 3..].to_vec());
    assert!(e.history().iter().all(|r| r.steps == 1));
}

proptest! {
    #[test]
    fn snapshot_rounding_matches_step_count(n in 0u64..5000) {
        let mut m = MetricsAccumulator::new(MetricsCfg::default());
        for _ in 0..n {
            m.record_step();
        }
        let snap = Snapshot::capture(0, &m.totals(), &IntervalHistory::with_capacity(1));
        prop_assert_eq!(snap.steps, n);
        prop_assert_eq!(snap.distance_m, (n as f64 * 0.5 * 100.0).round() / 100.0);
        prop_assert_eq!(snap.calories, (n as f64 * 0.04).round() as u64);
    }

    #[test]
    fn history_never_exceeds_capacity(n in 0usize..2000) {
        let mut h = IntervalHistory::with_capacity(720);
        for i in 0..n {
            h.push(IntervalRecord {
                timestamp_ms: i as u64,
                steps: 1,
                distance_m: 0.5,
                calories: 0.04,
            });
        }
        prop_assert_eq!(h.len(), n.min(720));
        if n > 0 {
            let first = h.iter().next().map(|r| r.timestamp_ms);
            prop_assert_eq!(first, Some((n - n.min(720)) as u64));
        }
    }
}
