//! Command implementations: live run, trace replay and self-check.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use serde_json::json;
use stride_core::error::Result as CoreResult;
use stride_core::{
    EngineCfg, EngineRunner, IngestStats, RawSample, SamplingCfg, SamplingMode, Snapshot,
    StrideEngine,
};
use stride_sensors::{GaitProfile, SimulatedWalk};
use stride_traits::clock::MonotonicClock;

use crate::error_fmt::CliError;

/// How long the live loop waits on the snapshot queue before re-checking
/// the stop conditions.
const POLL: Duration = Duration::from_millis(100);

/// Totals printed when a command finishes.
#[derive(Debug)]
pub struct RunSummary {
    pub mode: &'static str,
    pub samples: u64,
    pub step_events: u64,
    pub first_step_ms: Option<u64>,
    pub last_step_ms: Option<u64>,
    pub rejected_non_finite: u64,
    pub rejected_over_limit: u64,
    pub snapshots: u64,
    pub final_snapshot: Snapshot,
}

impl RunSummary {
    fn new(mode: &'static str, stats: IngestStats, snapshots: u64, final_snapshot: Snapshot) -> Self {
        Self {
            mode,
            samples: stats.samples(),
            step_events: final_snapshot.steps,
            first_step_ms: stats.first_step_ms,
            last_step_ms: stats.last_step_ms,
            rejected_non_finite: stats.rejected_non_finite,
            rejected_over_limit: stats.rejected_over_limit,
            snapshots,
            final_snapshot,
        }
    }
}

fn snapshot_json(s: &Snapshot) -> serde_json::Value {
    let intervals: Vec<_> = s
        .interval_history
        .iter()
        .map(|r| {
            json!({
                "timestamp_ms": r.timestamp_ms,
                "steps": r.steps,
                "distance_m": r.distance_m,
                "calories": r.calories,
            })
        })
        .collect();
    json!({
        "published_at_ms": s.published_at_ms,
        "steps": s.steps,
        "distance_m": s.distance_m,
        "calories": s.calories,
        "active_time_units": s.active_time_units,
        "interval_history": intervals,
    })
}

pub fn print_snapshot(s: &Snapshot, json_mode: bool) {
    if json_mode {
        let mut v = snapshot_json(s);
        v["type"] = json!("snapshot");
        println!("{v}");
    } else {
        println!(
            "t={}ms steps={} distance={:.2}m calories={} active={} intervals={}",
            s.published_at_ms,
            s.steps,
            s.distance_m,
            s.calories,
            s.active_time_units,
            s.interval_history.len()
        );
    }
}

pub fn print_summary(sum: &RunSummary, json_mode: bool) {
    let s = &sum.final_snapshot;
    if json_mode {
        let line = json!({
            "type": "summary",
            "mode": sum.mode,
            "samples": sum.samples,
            "step_events": sum.step_events,
            "first_step_ms": sum.first_step_ms,
            "last_step_ms": sum.last_step_ms,
            "rejected_non_finite": sum.rejected_non_finite,
            "rejected_over_limit": sum.rejected_over_limit,
            "snapshots": sum.snapshots,
            "final": snapshot_json(s),
        });
        println!("{line}");
    } else {
        println!(
            "{} complete: steps={} distance={:.2}m calories={} active={} intervals={}",
            sum.mode,
            s.steps,
            s.distance_m,
            s.calories,
            s.active_time_units,
            s.interval_history.len()
        );
        println!(
            "samples={} rejected(non-finite={}, over-limit={}) snapshots={}",
            sum.samples, sum.rejected_non_finite, sum.rejected_over_limit, sum.snapshots
        );
    }
}

/// Deterministic offline run; snapshots follow the trace's own clock.
pub fn run_replay(cfg: &stride_config::Config, trace: &Path, json_mode: bool) -> eyre::Result<RunSummary> {
    let rows = stride_config::load_trace_csv(trace)
        .map_err(|e| eyre::Report::new(CliError::Trace(format!("{e}"))))?;
    let start_ms = rows.first().map_or(0, |r| r.t_ms);

    let mut engine = StrideEngine::builder()
        .with_cfg(EngineCfg::from(cfg))
        .with_start_ms(start_ms)
        .build()?;
    tracing::info!(path = %trace.display(), rows = rows.len(), start_ms, "replay start");

    for row in &rows {
        engine.ingest(&RawSample::new(row.t_ms, row.ax, row.ay, row.az));
        if let Some(snap) = engine.publish_if_due(row.t_ms) {
            print_snapshot(&snap, json_mode);
        }
    }

    let sum = RunSummary::new(
        "replay",
        engine.stats(),
        engine.published_count(),
        engine.snapshot(),
    );
    tracing::info!(steps = sum.final_snapshot.steps, "replay complete");
    Ok(sum)
}

/// Live run against the simulated gait sensor until the duration elapses
/// or `stop` is raised.
pub fn run_live(
    cfg: &stride_config::Config,
    duration_ms: Option<u64>,
    cadence_hz: f64,
    amplitude: f64,
    stop: &Arc<AtomicBool>,
    json_mode: bool,
) -> eyre::Result<RunSummary> {
    if !(cadence_hz.is_finite() && cadence_hz > 0.0) {
        return Err(eyre::Report::new(CliError::InvalidConfig(format!(
            "--cadence-hz must be > 0, got {cadence_hz}"
        ))));
    }
    if !(amplitude.is_finite() && amplitude >= 0.0) {
        return Err(eyre::Report::new(CliError::InvalidConfig(format!(
            "--amplitude must be >= 0, got {amplitude}"
        ))));
    }

    let sampling = SamplingCfg::from(&cfg.sensor);
    let profile = GaitProfile {
        rate_hz: sampling.sample_rate_hz,
        ..GaitProfile::default()
    }
    .with_cadence_hz(cadence_hz)
    .with_amplitude(amplitude);

    let runner = EngineRunner::spawn(
        SimulatedWalk::new(profile),
        EngineCfg::from(cfg),
        &sampling,
        SamplingMode::Paced(sampling.sample_rate_hz),
        MonotonicClock::new(),
    )?;

    let started = Instant::now();
    let deadline = duration_ms.map(Duration::from_millis);
    let mut snapshots = 0u64;
    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!("stop requested");
            break;
        }
        if deadline.is_some_and(|d| started.elapsed() >= d) {
            break;
        }
        if let Ok(snap) = runner.snapshots().recv_timeout(POLL) {
            snapshots += 1;
            print_snapshot(&snap, json_mode);
        }
    }

    let report = runner.finish().wrap_err("stopping engine runner")?;
    Ok(RunSummary::new("run", report.stats, snapshots, report.snapshot))
}

/// Push a 30 s synthetic walk through an engine built from `cfg`.
pub fn self_check(cfg: &stride_config::Config) -> CoreResult<u64> {
    let mut engine = StrideEngine::builder()
        .with_cfg(EngineCfg::from(cfg))
        .build()?;
    let profile = GaitProfile {
        rate_hz: cfg.sensor.sample_rate_hz,
        ..GaitProfile::default()
    };
    for (t, a) in profile.trace(30_000) {
        engine.ingest(&RawSample { timestamp_ms: t, accel: a });
    }
    let steps = engine.totals().steps;
    if steps == 0 {
        eyre::bail!("self-check failed: synthetic walk produced no steps");
    }
    Ok(steps)
}
