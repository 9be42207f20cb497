//! Adaptive-threshold step detector.
//!
//! Per accepted sample:
//! 1. Reject outright when the total linear magnitude exceeds
//!    `max_total_accel` (shakes, drops). Nothing is mutated.
//! 2. Push the total magnitude into a fixed FIFO window and take its mean.
//! 3. Gate on horizontal dominance: horizontal must exceed both an absolute
//!    floor and `vertical * horizontal_ratio`.
//! 4. Fire when the gate holds, the smoothed magnitude beats the threshold and
//!    more than `min_step_interval_ms` passed since the previous step.
//!
//! The threshold rises slightly after each step and decays on every other
//! accepted sample, always clamped to `[min_threshold, max_threshold]`.

use std::collections::VecDeque;

use crate::config::DetectorCfg;
use crate::motion::MotionComponents;

/// Result of one detector update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Step,
    NoStep,
    /// Magnitude above the shake limit; detector state untouched.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct StepDetector {
    cfg: DetectorCfg,
    threshold: f64,
    last_step_ms: Option<u64>,
    window: VecDeque<f64>,
}

impl StepDetector {
    pub fn new(cfg: DetectorCfg) -> Self {
        let cap = cfg.window.max(1);
        let threshold = cfg
            .initial_threshold
            .clamp(cfg.min_threshold, cfg.max_threshold);
        Self {
            cfg,
            threshold,
            last_step_ms: None,
            window: VecDeque::with_capacity(cap),
        }
    }

    pub fn update(&mut self, now_ms: u64, m: &MotionComponents) -> Detection {
        // NaN from overflowing inputs counts as over the limit
        if m.total.is_nan() || m.total > self.cfg.max_total_accel {
            return Detection::Discarded;
        }

        let cap = self.cfg.window.max(1);
        self.window.push_back(m.total);
        if self.window.len() > cap {
            self.window.pop_front();
        }
        let smoothed = self.smoothed();

        let gate = m.horizontal > self.cfg.min_horizontal_accel
            && m.horizontal > m.vertical * self.cfg.horizontal_ratio;
        let debounced = match self.last_step_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.cfg.min_step_interval_ms,
        };

        if gate && smoothed > self.threshold && debounced {
            self.last_step_ms = Some(now_ms);
            self.threshold = (self.threshold * self.cfg.rise_factor).min(self.cfg.max_threshold);
            tracing::trace!(now_ms, smoothed, threshold = self.threshold, "step fired");
            Detection::Step
        } else {
            self.threshold = (self.threshold * self.cfg.decay_factor).max(self.cfg.min_threshold);
            Detection::NoStep
        }
    }

    /// Mean of the smoothing window; 0 when empty.
    pub fn smoothed(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn last_step_ms(&self) -> Option<u64> {
        self.last_step_ms
    }

    #[inline]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn reset(&mut self) {
        self.threshold = self
            .cfg
            .initial_threshold
            .clamp(self.cfg.min_threshold, self.cfg.max_threshold);
        self.last_step_ms = None;
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(h: f64) -> MotionComponents {
        MotionComponents {
            total: h,
            horizontal: h,
            vertical: 0.0,
        }
    }

    #[test]
    fn first_step_is_not_debounced() {
        let mut d = StepDetector::new(DetectorCfg {
            window: 1,
            ..DetectorCfg::default()
        });
        assert_eq!(d.update(10, &walk(1.1)), Detection::Step);
        assert_eq!(d.last_step_ms(), Some(10));
        assert!((d.threshold() - 1.008).abs() < 1e-12);
    }

    #[test]
    fn debounce_is_strict() {
        let mut d = StepDetector::new(DetectorCfg {
            window: 1,
            ..DetectorCfg::default()
        });
        assert_eq!(d.update(0, &walk(1.2)), Detection::Step);
        assert_eq!(d.update(2500, &walk(1.2)), Detection::NoStep);
        assert_eq!(d.update(2501, &walk(1.2)), Detection::Step);
    }

    #[test]
    fn vertical_dominance_blocks_step() {
        let mut d = StepDetector::new(DetectorCfg {
            window: 1,
            ..DetectorCfg::default()
        });
        let m = MotionComponents {
            total: 1.1,
            horizontal: 0.6,
            vertical: 0.9,
        };
        assert_eq!(d.update(0, &m), Detection::NoStep);
    }

    #[test]
    fn weak_horizontal_blocks_step() {
        let mut d = StepDetector::new(DetectorCfg {
            window: 1,
            initial_threshold: 0.85,
            ..DetectorCfg::default()
        });
        let m = MotionComponents {
            total: 1.1,
            horizontal: 0.3,
            vertical: 0.0,
        };
        assert_eq!(d.update(0, &m), Detection::NoStep);
    }

    #[test]
    fn discard_leaves_state_untouched() {
        let mut d = StepDetector::new(DetectorCfg::default());
        d.update(0, &walk(0.2));
        let before = (d.threshold(), d.window_len(), d.smoothed());
        assert_eq!(d.update(20, &walk(3.6)), Detection::Discarded);
        assert_eq!((d.threshold(), d.window_len(), d.smoothed()), before);
    }

    #[test]
    fn nan_magnitude_is_discarded() {
        let mut d = StepDetector::new(DetectorCfg::default());
        assert_eq!(d.update(0, &walk(f64::NAN)), Detection::Discarded);
        assert_eq!(d.window_len(), 0);
    }

    #[test]
    fn window_is_bounded_fifo() {
        let mut d = StepDetector::new(DetectorCfg::default());
        for i in 0..20 {
            d.update(i * 20, &walk(0.1));
        }
        assert_eq!(d.window_len(), 8);
        assert!((d.smoothed() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn threshold_decays_to_floor() {
        let mut d = StepDetector::new(DetectorCfg::default());
        for i in 0..500 {
            d.update(i * 20, &walk(0.0));
        }
        assert_eq!(d.threshold(), 0.85);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut d = StepDetector::new(DetectorCfg {
            window: 1,
            ..DetectorCfg::default()
        });
        d.update(0, &walk(1.2));
        d.reset();
        assert_eq!(d.threshold(), 1.0);
        assert_eq!(d.last_step_ms(), None);
        assert_eq!(d.window_len(), 0);
    }
}
