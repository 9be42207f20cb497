//! `From` implementations bridging `stride_config` types to `stride_core` types.

use crate::config::{
    DetectorCfg, EngineCfg, GravityCfg, HistoryCfg, MetricsCfg, PublishCfg, SamplingCfg,
};

// ── GravityCfg ───────────────────────────────────────────────────────────────

impl From<&stride_config::GravityCfg> for GravityCfg {
    fn from(c: &stride_config::GravityCfg) -> Self {
        Self { alpha: c.alpha }
    }
}

// ── DetectorCfg ──────────────────────────────────────────────────────────────

impl From<&stride_config::DetectorCfg> for DetectorCfg {
    fn from(c: &stride_config::DetectorCfg) -> Self {
        Self {
            max_total_accel: c.max_total_accel,
            min_horizontal_accel: c.min_horizontal_accel,
            horizontal_ratio: c.horizontal_ratio,
            min_step_interval_ms: c.min_step_interval_ms,
            window: c.window,
            min_threshold: c.min_threshold,
            max_threshold: c.max_threshold,
            initial_threshold: c.initial_threshold,
            rise_factor: c.rise_factor,
            decay_factor: c.decay_factor,
        }
    }
}

// ── MetricsCfg ───────────────────────────────────────────────────────────────

impl From<&stride_config::MetricsCfg> for MetricsCfg {
    fn from(c: &stride_config::MetricsCfg) -> Self {
        Self {
            step_length_m: c.step_length_m,
            calories_per_step: c.calories_per_step,
            active_units_per_step: c.active_units_per_step,
        }
    }
}

// ── HistoryCfg / PublishCfg ──────────────────────────────────────────────────

impl From<&stride_config::HistoryCfg> for HistoryCfg {
    fn from(c: &stride_config::HistoryCfg) -> Self {
        Self {
            interval_ms: c.interval_ms,
            capacity: c.capacity,
        }
    }
}

impl From<&stride_config::PublisherCfg> for PublishCfg {
    fn from(c: &stride_config::PublisherCfg) -> Self {
        Self {
            interval_ms: c.interval_ms,
            subscriber_depth: c.subscriber_depth,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&stride_config::SensorCfg> for SamplingCfg {
    fn from(c: &stride_config::SensorCfg) -> Self {
        Self {
            sample_rate_hz: c.sample_rate_hz,
            read_timeout_ms: c.read_timeout_ms,
            queue_depth: c.queue_depth,
        }
    }
}

// ── EngineCfg ────────────────────────────────────────────────────────────────

impl From<&stride_config::Config> for EngineCfg {
    fn from(c: &stride_config::Config) -> Self {
        Self {
            gravity: (&c.gravity).into(),
            detector: (&c.detector).into(),
            metrics: (&c.metrics).into(),
            history: (&c.history).into(),
            publish: (&c.publisher).into(),
        }
    }
}
