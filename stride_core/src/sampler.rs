//! Background accelerometer sampling.
//!
//! Spawns a thread that owns the `Accelerometer`, stamps each reading with
//! milliseconds since the sampler epoch and pushes it through a bounded
//! channel. Delivery is blocking so no sample is ever coalesced; the thread
//! re-checks the shutdown flag while waiting for queue space.
//!
//! Each `Sampler` owns exactly one thread, joined when the `Sampler` is
//! dropped.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use stride_traits::Accelerometer;
use stride_traits::clock::Clock;

use crate::engine::RawSample;

/// How long a blocked send waits before re-checking the shutdown flag.
const SEND_POLL: Duration = Duration::from_millis(25);

pub struct Sampler {
    rx: xch::Receiver<RawSample>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

/// Outcome of pushing one sample downstream.
enum Delivery {
    Sent,
    Closed,
}

fn deliver(tx: &xch::Sender<RawSample>, mut sample: RawSample, shutdown: &AtomicBool) -> Delivery {
    loop {
        match tx.send_timeout(sample, SEND_POLL) {
            Ok(()) => return Delivery::Sent,
            Err(xch::SendTimeoutError::Disconnected(_)) => return Delivery::Closed,
            Err(xch::SendTimeoutError::Timeout(s)) => {
                if shutdown.load(Ordering::Relaxed) {
                    return Delivery::Closed;
                }
                sample = s;
            }
        }
    }
}

impl Sampler {
    /// Rate-paced sampler: sleeps one period of `hz` after every read.
    pub fn spawn<A, C>(accel: A, hz: u32, timeout: Duration, depth: usize, clock: C) -> Self
    where
        A: Accelerometer + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let period = Duration::from_micros(crate::util::period_us(hz));
        Self::spawn_inner(accel, Some(period), timeout, depth, clock)
    }

    /// Event-driven sampler: relies on `read(timeout)` blocking until data is
    /// ready and adds no sleeps of its own.
    pub fn spawn_event<A, C>(accel: A, timeout: Duration, depth: usize, clock: C) -> Self
    where
        A: Accelerometer + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        Self::spawn_inner(accel, None, timeout, depth, clock)
    }

    fn spawn_inner<A, C>(
        mut accel: A,
        period: Option<Duration>,
        timeout: Duration,
        depth: usize,
        clock: C,
    ) -> Self
    where
        A: Accelerometer + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(depth.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            let mut errors: u64 = 0;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler received shutdown signal");
                    break;
                }

                match accel.read(timeout) {
                    Ok(Some(a)) => {
                        let now = clock.ms_since(epoch);
                        last_ok_clone.store(now, Ordering::Relaxed);
                        let sample = RawSample {
                            timestamp_ms: now,
                            accel: a,
                        };
                        if let Delivery::Closed = deliver(&tx, sample, &shutdown_clone) {
                            tracing::debug!("sampler consumer gone, exiting");
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!("accelerometer stream ended");
                        break;
                    }
                    Err(e) => {
                        errors = errors.saturating_add(1);
                        if errors == 1 || errors % 100 == 0 {
                            tracing::debug!(error = %e, errors, "accelerometer read failed");
                        }
                    }
                }

                if let Some(p) = period {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    clock.sleep(p);
                }
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Receiving side of the sample queue; disconnects after end of stream.
    pub fn receiver(&self) -> xch::Receiver<RawSample> {
        self.rx.clone()
    }

    /// Instant that sample timestamps count from.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Timestamp of the most recent successful read (0 before the first).
    pub fn last_ok_ms(&self) -> u64 {
        self.last_ok.load(Ordering::Relaxed)
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok_ms())
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads, after the in-flight read returns
        // (bounded by the read timeout), or within one SEND_POLL while
        // waiting for queue space.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked during shutdown"),
            }
        }
    }
}
