//! Cumulative per-session fitness metrics.

use crate::config::MetricsCfg;

/// Running totals; monotonically non-decreasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accumulators {
    pub steps: u64,
    pub distance_m: f64,
    pub calories: f64,
    pub active_time_units: f64,
}

#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    cfg: MetricsCfg,
    totals: Accumulators,
}

impl MetricsAccumulator {
    pub fn new(cfg: MetricsCfg) -> Self {
        Self {
            cfg,
            totals: Accumulators::default(),
        }
    }

    /// Apply one confirmed step and return the updated totals.
    pub fn record_step(&mut self) -> Accumulators {
        let t = &mut self.totals;
        t.steps = t.steps.saturating_add(1);
        t.distance_m += self.cfg.step_length_m;
        t.calories += self.cfg.calories_per_step;
        t.active_time_units += self.cfg.active_units_per_step;
        *t
    }

    #[inline]
    pub fn totals(&self) -> Accumulators {
        self.totals
    }

    #[inline]
    pub fn cfg(&self) -> &MetricsCfg {
        &self.cfg
    }

    pub fn reset(&mut self) {
        self.totals = Accumulators::default();
    }
}
