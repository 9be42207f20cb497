//! Validating builder for `StrideEngine`.
//!
//! Every section falls back to its default when not set. `build()` is the
//! single place where runtime configuration is checked, so both the CLI and
//! the runner go through the same rules.

use crate::config::{DetectorCfg, EngineCfg, GravityCfg, HistoryCfg, MetricsCfg, PublishCfg};
use crate::engine::StrideEngine;
use crate::error::{BuildError, Result};

#[derive(Debug, Default, Clone)]
pub struct EngineBuilder {
    gravity: Option<GravityCfg>,
    detector: Option<DetectorCfg>,
    metrics: Option<MetricsCfg>,
    history: Option<HistoryCfg>,
    publish: Option<PublishCfg>,
    start_ms: u64,
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

/// Check a complete engine configuration.
pub fn validate(cfg: &EngineCfg) -> Result<()> {
    let g = &cfg.gravity;
    if !(g.alpha.is_finite() && (0.0..1.0).contains(&g.alpha)) {
        return Err(invalid("gravity alpha must be in [0, 1)"));
    }

    let d = &cfg.detector;
    if !(d.max_total_accel.is_finite() && d.max_total_accel > 0.0) {
        return Err(invalid("max_total_accel must be > 0"));
    }
    if !non_negative(d.min_horizontal_accel) {
        return Err(invalid("min_horizontal_accel must be >= 0"));
    }
    if !non_negative(d.horizontal_ratio) {
        return Err(invalid("horizontal_ratio must be >= 0"));
    }
    if d.window == 0 {
        return Err(invalid("smoothing window must be >= 1"));
    }
    if !(d.min_threshold.is_finite() && d.max_threshold.is_finite()) {
        return Err(invalid("threshold bounds must be finite"));
    }
    if d.min_threshold < 0.0 || d.min_threshold > d.max_threshold {
        return Err(invalid("threshold bounds must satisfy 0 <= min <= max"));
    }
    if !(d.min_threshold..=d.max_threshold).contains(&d.initial_threshold) {
        return Err(invalid("initial threshold must lie within the bounds"));
    }
    if !(d.rise_factor.is_finite() && d.rise_factor >= 1.0) {
        return Err(invalid("rise_factor must be >= 1"));
    }
    if !(d.decay_factor.is_finite() && d.decay_factor > 0.0 && d.decay_factor <= 1.0) {
        return Err(invalid("decay_factor must be in (0, 1]"));
    }

    let m = &cfg.metrics;
    if !(non_negative(m.step_length_m)
        && non_negative(m.calories_per_step)
        && non_negative(m.active_units_per_step))
    {
        return Err(invalid("per-step metric increments must be finite and >= 0"));
    }

    if cfg.history.interval_ms == 0 {
        return Err(invalid("history interval_ms must be >= 1"));
    }
    if cfg.history.capacity == 0 {
        return Err(invalid("history capacity must be >= 1"));
    }
    if cfg.publish.interval_ms == 0 {
        return Err(invalid("publish interval_ms must be >= 1"));
    }
    if cfg.publish.subscriber_depth == 0 {
        return Err(invalid("subscriber_depth must be >= 1"));
    }
    Ok(())
}

impl EngineBuilder {
    pub fn with_gravity(mut self, gravity: GravityCfg) -> Self {
        self.gravity = Some(gravity);
        self
    }
    pub fn with_detector(mut self, detector: DetectorCfg) -> Self {
        self.detector = Some(detector);
        self
    }
    pub fn with_metrics(mut self, metrics: MetricsCfg) -> Self {
        self.metrics = Some(metrics);
        self
    }
    pub fn with_history(mut self, history: HistoryCfg) -> Self {
        self.history = Some(history);
        self
    }
    pub fn with_publish(mut self, publish: PublishCfg) -> Self {
        self.publish = Some(publish);
        self
    }
    /// Replace every section at once.
    pub fn with_cfg(self, cfg: EngineCfg) -> Self {
        self.with_gravity(cfg.gravity)
            .with_detector(cfg.detector)
            .with_metrics(cfg.metrics)
            .with_history(cfg.history)
            .with_publish(cfg.publish)
    }
    /// Session start; the first interval bucket and publish period begin here.
    pub fn with_start_ms(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }

    pub fn build(self) -> Result<StrideEngine> {
        let cfg = EngineCfg {
            gravity: self.gravity.unwrap_or_default(),
            detector: self.detector.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            history: self.history.unwrap_or_default(),
            publish: self.publish.unwrap_or_default(),
        };
        validate(&cfg)?;
        Ok(StrideEngine::from_cfg(cfg, self.start_ms))
    }
}
