//! Configuration types for the step engine.
//!
//! These are the runtime configuration structs used by `StrideEngine` and the
//! runner. They are separate from the TOML-deserialized config in
//! `stride_config`; see `conversions` for the mapping.

/// Gravity low-pass configuration.
#[derive(Debug, Clone)]
pub struct GravityCfg {
    /// Weight kept from the previous estimate, `[0, 1)`. Default: 0.88.
    pub alpha: f64,
}

impl Default for GravityCfg {
    fn default() -> Self {
        Self { alpha: 0.88 }
    }
}

/// Step detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorCfg {
    /// Discard samples whose total linear magnitude exceeds this (g). Default: 3.5.
    pub max_total_accel: f64,
    /// Horizontal magnitude must exceed this (g). Default: 0.35.
    pub min_horizontal_accel: f64,
    /// Horizontal must exceed `vertical * horizontal_ratio`. Default: 1.2.
    pub horizontal_ratio: f64,
    /// Minimum time between two steps. Default: 2500 ms.
    pub min_step_interval_ms: u64,
    /// Smoothing window length in samples. Default: 8.
    pub window: usize,
    pub min_threshold: f64,
    pub max_threshold: f64,
    /// Threshold at session start; must lie in `[min_threshold, max_threshold]`.
    pub initial_threshold: f64,
    pub rise_factor: f64,
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

/// Per-step metric increments.
#[derive(Debug, Clone)]
pub struct MetricsCfg {
    pub step_length_m: f64,
    pub calories_per_step: f64,
    /// Opaque activity score added per step.
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

/// Interval history bucketing.
#[derive(Debug, Clone)]
pub struct HistoryCfg {
    pub interval_ms: u64,
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

/// Snapshot publication cadence.
#[derive(Debug, Clone)]
pub struct PublishCfg {
    pub interval_ms: u64,
    pub subscriber_depth: usize,
}

impl Default for PublishCfg {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            subscriber_depth: 16,
        }
    }
}

/// Sensor delivery settings used by the sampler and stall watchdog.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    pub sample_rate_hz: u32,
    pub read_timeout_ms: u64,
    pub queue_depth: usize,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            read_timeout_ms: 100,
            queue_depth: 64,
        }
    }
}

/// Everything the engine needs, grouped for the builder and runner.
#[derive(Debug, Clone, Default)]
pub struct EngineCfg {
    pub gravity: GravityCfg,
    pub detector: DetectorCfg,
    pub metrics: MetricsCfg,
    pub history: HistoryCfg,
    pub publish: PublishCfg,
}
