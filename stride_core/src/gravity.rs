//! Gravity separation: a single-pole low-pass filter per axis.

use stride_traits::Acceleration;

/// Slow-varying gravity vector in device coordinates (g).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GravityEstimate {
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

impl GravityEstimate {
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.gx * self.gx + self.gy * self.gy + self.gz * self.gz).sqrt()
    }
}

/// `g <- alpha * g + (1 - alpha) * raw`, once per accepted sample.
#[derive(Debug, Clone)]
pub struct GravityEstimator {
    alpha: f64,
    estimate: GravityEstimate,
}

impl GravityEstimator {
    /// Starts from the zero vector; the estimate settles within ~40 samples
    /// at the default alpha.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            estimate: GravityEstimate::default(),
        }
    }

    pub fn update(&mut self, raw: &Acceleration) -> GravityEstimate {
        let a = self.alpha;
        let b = 1.0 - a;
        let g = &mut self.estimate;
        g.gx = a * g.gx + b * raw.x;
        g.gy = a * g.gy + b * raw.y;
        g.gz = a * g.gz + b * raw.z;
        *g
    }

    #[inline]
    pub fn estimate(&self) -> GravityEstimate {
        self.estimate
    }

    pub fn reset(&mut self) {
        self.estimate = GravityEstimate::default();
    }
}
