pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One gravity-inclusive accelerometer reading, in units of g.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when every axis is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Push-style 3-axis accelerometer source.
///
/// `read` blocks until the next reading is available or `timeout` expires.
/// `Ok(None)` means the stream has ended and no further readings will arrive.
pub trait Accelerometer {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<Acceleration>, Box<dyn std::error::Error + Send + Sync>>;
}
