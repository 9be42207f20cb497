#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and accelerometer trace parsing for the step engine.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; omitted keys fall back to the tuned defaults.
//! - The trace CSV loader enforces headers and timestamp ordering so that a
//!   replayed recording behaves like a live sensor stream.
use serde::Deserialize;

/// One recorded accelerometer sample.
///
/// Expected headers:
/// t_ms,ax,ay,az
///
/// Example:
/// t_ms,ax,ay,az
/// 0,0.01,-0.02,0.99
/// 20,0.35,0.04,1.02
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub t_ms: u64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// Target accelerometer delivery rate.
    pub sample_rate_hz: u32,
    /// Max time to wait for a single reading before retrying.
    pub read_timeout_ms: u64,
    /// Capacity of the sample channel between sampler and engine.
    pub queue_depth: usize,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            read_timeout_ms: 100,
            queue_depth: 64,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GravityCfg {
    /// Low-pass coefficient; weight kept from the previous estimate.
    pub alpha: f64,
}

impl Default for GravityCfg {
    fn default() -> Self {
        Self { alpha: 0.88 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DetectorCfg {
    /// Samples with total linear magnitude above this are discarded.
    pub max_total_accel: f64,
    pub min_horizontal_accel: f64,
    /// Horizontal must exceed vertical times this ratio.
    pub horizontal_ratio: f64,
    /// Debounce between consecutive steps.
    pub min_step_interval_ms: u64,
    /// Moving-average window length (samples).
    pub window: usize,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub initial_threshold: f64,
    /// Multiplier applied to the threshold after a step.
    pub rise_factor: f64,
    /// Multiplier applied to the threshold on every non-step sample.
    pub decay_factor: f64,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            max_total_accel: 3.5,
            min_horizontal_accel: 0.35,
            horizontal_ratio: 1.2,
            min_step_interval_ms: 2500,
            window: 8,
            min_threshold: 0.85,
            max_threshold: 1.15,
            initial_threshold: 1.0,
            rise_factor: 1.008,
            decay_factor: 0.998,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MetricsCfg {
    pub step_length_m: f64,
    pub calories_per_step: f64,
    pub active_units_per_step: f64,
}

impl Default for MetricsCfg {
    fn default() -> Self {
        Self {
            step_length_m: 0.5,
            calories_per_step: 0.04,
            active_units_per_step: 0.3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
    /// Bucket length for interval records.
    pub interval_ms: u64,
    /// Max retained records (720 = one hour of 5 s buckets).
    pub capacity: usize,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            capacity: 720,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublisherCfg {
    /// Snapshot cadence.
    pub interval_ms: u64,
    /// Buffered snapshots for a slow subscriber before new ones are dropped.
    pub subscriber_depth: usize,
}

impl Default for PublisherCfg {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            subscriber_depth: 16,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub gravity: GravityCfg,
    pub detector: DetectorCfg,
    pub metrics: MetricsCfg,
    pub history: HistoryCfg,
    pub publisher: PublisherCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn is_positive_finite(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.sample_rate_hz == 0 {
            eyre::bail!("sensor.sample_rate_hz must be > 0");
        }
        if self.sensor.sample_rate_hz > 1000 {
            eyre::bail!("sensor.sample_rate_hz is unreasonably large (>1000)");
        }
        if self.sensor.read_timeout_ms == 0 {
            eyre::bail!("sensor.read_timeout_ms must be >= 1");
        }
        if self.sensor.queue_depth == 0 {
            eyre::bail!("sensor.queue_depth must be >= 1");
        }

        // Gravity
        if !(self.gravity.alpha >= 0.0 && self.gravity.alpha < 1.0) {
            eyre::bail!("gravity.alpha must be in [0.0, 1.0)");
        }

        // Detector
        let d = &self.detector;
        if !is_positive_finite(d.max_total_accel) {
            eyre::bail!("detector.max_total_accel must be > 0");
        }
        if !(d.min_horizontal_accel.is_finite() && d.min_horizontal_accel >= 0.0) {
            eyre::bail!("detector.min_horizontal_accel must be >= 0");
        }
        if !is_positive_finite(d.horizontal_ratio) {
            eyre::bail!("detector.horizontal_ratio must be > 0");
        }
        if d.window == 0 {
            eyre::bail!("detector.window must be >= 1");
        }
        if d.window > 1024 {
            eyre::bail!("detector.window is unreasonably large (>1024)");
        }
        if !is_positive_finite(d.min_threshold) || !is_positive_finite(d.max_threshold) {
            eyre::bail!("detector thresholds must be > 0");
        }
        if d.min_threshold > d.max_threshold {
            eyre::bail!("detector.min_threshold must be <= detector.max_threshold");
        }
        if !(d.min_threshold..=d.max_threshold).contains(&d.initial_threshold) {
            eyre::bail!("detector.initial_threshold must be within [min_threshold, max_threshold]");
        }
        if !(d.rise_factor.is_finite() && d.rise_factor >= 1.0) {
            eyre::bail!("detector.rise_factor must be >= 1.0");
        }
        if !(d.decay_factor > 0.0 && d.decay_factor <= 1.0) {
            eyre::bail!("detector.decay_factor must be in (0.0, 1.0]");
        }

        // Metrics
        let m = &self.metrics;
        for (name, v) in [
            ("metrics.step_length_m", m.step_length_m),
            ("metrics.calories_per_step", m.calories_per_step),
            ("metrics.active_units_per_step", m.active_units_per_step),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                eyre::bail!("{name} must be a finite value >= 0");
            }
        }

        // History
        if self.history.interval_ms == 0 {
            eyre::bail!("history.interval_ms must be >= 1");
        }
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }

        // Publisher
        if self.publisher.interval_ms == 0 {
            eyre::bail!("publisher.interval_ms must be >= 1");
        }
        if self.publisher.subscriber_depth == 0 {
            eyre::bail!("publisher.subscriber_depth must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// Load a recorded accelerometer trace.
///
/// Headers must be exactly `t_ms,ax,ay,az` and timestamps must never go
/// backwards. Non-finite axis values are accepted here; the engine drops them.
pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["t_ms", "ax", "ay", "az"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 't_ms,ax,ay,az', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<TraceRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let row = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        };
        if let Some(prev) = rows.last()
            && row.t_ms < prev.t_ms
        {
            eyre::bail!(
                "trace timestamps must be non-decreasing (row {}: {} < {})",
                idx + 2,
                row.t_ms,
                prev.t_ms
            );
        }
        rows.push(row);
    }

    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} contains no samples", path);
    }
    Ok(rows)
}
