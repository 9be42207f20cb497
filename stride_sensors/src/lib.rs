//! Accelerometer sources for the stride engine.
//!
//! - `SimulatedWalk`: synthetic gait with short horizontal bursts on a level
//!   device, for demos and tests
//! - `SimulatedBounce`: pure vertical oscillation (no steps expected)
//! - `ReplayAccelerometer`: plays back a fixed sequence, then ends the stream
//! - `ChannelAccelerometer`: push-based source fed by a platform callback

pub mod error;

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::time::Duration;

use crossbeam_channel as xch;
use stride_traits::{Accelerometer, Acceleration};

use crate::error::SensorError;

type ReadResult = Result<Option<Acceleration>, Box<dyn std::error::Error + Send + Sync>>;

/// Deterministic gait shape: gravity on +z plus a burst of alternating
/// horizontal pulses once per step period.
#[derive(Debug, Clone, PartialEq)]
pub struct GaitProfile {
    pub rate_hz: u32,
    pub step_period_ms: u64,
    pub burst_ms: u64,
    /// Quiet time before the first burst so the gravity filter settles.
    pub lead_in_ms: u64,
    /// Horizontal pulse amplitude (g).
    pub amplitude: f64,
}

impl Default for GaitProfile {
    fn default() -> Self {
        Self {
            rate_hz: 50,
            step_period_ms: 1000,
            burst_ms: 200,
            lead_in_ms: 1000,
            amplitude: 1.5,
        }
    }
}

impl GaitProfile {
    /// Profile with the given step cadence (bursts per second).
    pub fn with_cadence_hz(mut self, cadence_hz: f64) -> Self {
        if cadence_hz.is_finite() && cadence_hz > 0.0 {
            self.step_period_ms = ((1000.0 / cadence_hz).round() as u64).max(1);
        }
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    #[inline]
    pub fn timestamp_ms(&self, index: u64) -> u64 {
        index.saturating_mul(1000) / u64::from(self.rate_hz.max(1))
    }

    pub fn accel_at(&self, index: u64) -> Acceleration {
        let t = self.timestamp_ms(index);
        let in_burst =
            t >= self.lead_in_ms && (t - self.lead_in_ms) % self.step_period_ms.max(1) < self.burst_ms;
        let x = if in_burst {
            if index % 2 == 0 {
                self.amplitude
            } else {
                -self.amplitude
            }
        } else {
            0.0
        };
        Acceleration::new(x, 0.0, 1.0)
    }

    /// `(timestamp_ms, sample)` pairs covering `[0, duration_ms)`.
    pub fn trace(&self, duration_ms: u64) -> Vec<(u64, Acceleration)> {
        (0u64..)
            .map(|i| (self.timestamp_ms(i), self.accel_at(i)))
            .take_while(|(t, _)| *t < duration_ms)
            .collect()
    }
}

/// Endless (or bounded) synthetic walk.
#[derive(Debug, Clone)]
pub struct SimulatedWalk {
    profile: GaitProfile,
    index: u64,
    limit: Option<u64>,
}

impl SimulatedWalk {
    pub fn new(profile: GaitProfile) -> Self {
        Self {
            profile,
            index: 0,
            limit: None,
        }
    }

    /// End the stream after `duration_ms` worth of samples.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        let n = duration_ms.saturating_mul(u64::from(self.profile.rate_hz.max(1))) / 1000;
        self.limit = Some(n);
        self
    }

    pub fn profile(&self) -> &GaitProfile {
        &self.profile
    }
}

impl Accelerometer for SimulatedWalk {
    fn read(&mut self, _timeout: Duration) -> ReadResult {
        if self.limit.is_some_and(|n| self.index >= n) {
            return Ok(None);
        }
        let a = self.profile.accel_at(self.index);
        self.index = self.index.saturating_add(1);
        Ok(Some(a))
    }
}

/// Device bouncing along gravity only: `z = 1 + amplitude * sin(2πt / period)`.
#[derive(Debug, Clone)]
pub struct SimulatedBounce {
    rate_hz: u32,
    period_ms: f64,
    amplitude: f64,
    index: u64,
    limit: Option<u64>,
}

impl SimulatedBounce {
    pub fn new(rate_hz: u32, period_ms: f64, amplitude: f64) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
            period_ms,
            amplitude,
            index: 0,
            limit: None,
        }
    }

    pub fn with_samples(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn accel_at(&self, index: u64) -> Acceleration {
        let t = index as f64 * 1000.0 / f64::from(self.rate_hz);
        Acceleration::new(0.0, 0.0, 1.0 + self.amplitude * (TAU * t / self.period_ms).sin())
    }
}

impl Accelerometer for SimulatedBounce {
    fn read(&mut self, _timeout: Duration) -> ReadResult {
        if self.limit.is_some_and(|n| self.index >= n) {
            return Ok(None);
        }
        let a = self.accel_at(self.index);
        self.index = self.index.saturating_add(1);
        Ok(Some(a))
    }
}

/// Plays back a recorded sequence once.
#[derive(Debug, Clone, Default)]
pub struct ReplayAccelerometer {
    samples: VecDeque<Acceleration>,
}

impl ReplayAccelerometer {
    pub fn new(samples: impl IntoIterator<Item = Acceleration>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl Accelerometer for ReplayAccelerometer {
    fn read(&mut self, _timeout: Duration) -> ReadResult {
        Ok(self.samples.pop_front())
    }
}

/// Sending half handed to whatever delivers platform sensor callbacks.
#[derive(Debug, Clone)]
pub struct AccelFeed {
    tx: xch::Sender<Acceleration>,
}

impl AccelFeed {
    /// Push one reading. Fails once the accelerometer side is gone.
    pub fn push(&self, a: Acceleration) -> error::Result<()> {
        self.tx
            .send(a)
            .map_err(|_| SensorError::Fault("accelerometer receiver dropped".into()))
    }
}

/// Pull side of a push-based sensor subscription. Dropping every `AccelFeed`
/// ends the stream.
#[derive(Debug)]
pub struct ChannelAccelerometer {
    rx: xch::Receiver<Acceleration>,
}

impl ChannelAccelerometer {
    pub fn channel(depth: usize) -> (AccelFeed, Self) {
        let (tx, rx) = xch::bounded(depth.max(1));
        (AccelFeed { tx }, Self { rx })
    }
}

impl Accelerometer for ChannelAccelerometer {
    fn read(&mut self, timeout: Duration) -> ReadResult {
        match self.rx.recv_timeout(timeout) {
            Ok(a) => Ok(Some(a)),
            Err(xch::RecvTimeoutError::Disconnected) => Ok(None),
            Err(xch::RecvTimeoutError::Timeout) => {
                tracing::trace!(?timeout, "no accelerometer data");
                Err(Box::new(SensorError::Timeout))
            }
        }
    }
}
