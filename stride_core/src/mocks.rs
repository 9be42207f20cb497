//! Test and helper mocks for stride_core

use std::time::Duration;

use stride_traits::{Accelerometer, Acceleration};

/// An accelerometer that always errors on read; the sampler keeps retrying
/// and the runner's stall watch eventually reports it.
pub struct NoopAccelerometer;

impl Accelerometer for NoopAccelerometer {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Acceleration>, Box<dyn std::error::Error + Send + Sync>> {
        std::thread::sleep(timeout.min(Duration::from_millis(5)));
        Err(Box::new(std::io::Error::other("noop accelerometer")))
    }
}
