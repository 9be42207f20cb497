//! Linear acceleration and its split into horizontal/vertical magnitudes
//! relative to the current gravity direction.

use crate::gravity::GravityEstimate;
use stride_traits::Acceleration;

/// Magnitudes derived from one sample (g).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionComponents {
    /// `|raw - g|`.
    pub total: f64,
    /// Magnitude orthogonal to gravity.
    pub horizontal: f64,
    /// Magnitude of the projection onto gravity.
    pub vertical: f64,
}

pub fn decompose(raw: &Acceleration, g: &GravityEstimate) -> MotionComponents {
    let fx = raw.x - g.gx;
    let fy = raw.y - g.gy;
    let fz = raw.z - g.gz;
    let total_sq = fx * fx + fy * fy + fz * fz;
    let total = total_sq.sqrt();

    // A zero gravity vector projects to nothing; the sample then counts as
    // fully horizontal.
    let g_norm = match g.norm() {
        n if n == 0.0 => 1.0,
        n => n,
    };
    let vertical = ((fx * g.gx + fy * g.gy + fz * g.gz) / g_norm).abs();
    let horizontal = (total_sq - vertical * vertical).max(0.0).sqrt();

    MotionComponents {
        total,
        horizontal,
        vertical,
    }
}
