//! Threaded driver: one actor thread owns the `StrideEngine`.
//!
//! The actor serializes three event sources with `crossbeam_channel::select!`:
//! samples from the `Sampler`, the publish ticker and control requests from
//! the `EngineRunner` handle. No lock ever guards engine state.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel as xch;
use stride_traits::Accelerometer;
use stride_traits::clock::Clock;

use crate::config::{EngineCfg, SamplingCfg};
use crate::engine::{IngestStats, StrideEngine};
use crate::error::{EngineError, Report, Result as CoreResult};
use crate::sampler::Sampler;
use crate::snapshot::Snapshot;

/// How the sampler thread paces reads.
#[derive(Debug, Clone, Copy)]
pub enum SamplingMode {
    /// Block on the sensor's own data-ready timing via `read(timeout)`.
    Event,
    /// Sleep one period of the given rate after every read.
    Paced(u32),
}

enum Control {
    Latest(xch::Sender<Option<Snapshot>>),
    Live(xch::Sender<Snapshot>),
    Stop(xch::Sender<RunReport>),
}

/// Final state handed back when the runner stops.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub stats: IngestStats,
}

/// Compute the stall threshold in milliseconds.
///
/// Starts from four sensor timeouts, never shorter than two sample periods so
/// a single missed sample does not count as a stall, and stays strictly below
/// the publish interval so a dead sensor is reported on the first tick.
#[inline]
fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64, publish_ms: u64) -> u64 {
    debug_assert!((1..=crate::util::MILLIS_PER_SEC).contains(&period_ms));

    let fast = fast_threshold_ms(sensor_timeout_ms);
    let two_p = two_periods_ms(period_ms);

    if publish_ms < two_p {
        return cap_below_interval(fast, publish_ms);
    }
    cap_below_interval(std::cmp::max(fast, two_p), publish_ms)
}

#[inline]
fn fast_threshold_ms(sensor_timeout_ms: u64) -> u64 {
    sensor_timeout_ms.saturating_mul(4)
}

#[inline]
fn two_periods_ms(period_ms: u64) -> u64 {
    period_ms.saturating_mul(2)
}

/// Strictly below `interval_ms` and at least 1 ms.
#[inline]
fn cap_below_interval(threshold: u64, interval_ms: u64) -> u64 {
    threshold.min(interval_ms.saturating_sub(1)).max(1)
}

#[inline]
fn stalled_now(elapsed_ms: u64, stalled_ms: u64, threshold_ms: u64) -> bool {
    elapsed_ms >= threshold_ms && stalled_ms > threshold_ms
}

/// Handle to a running engine actor. Dropping it stops and joins every thread.
pub struct EngineRunner {
    ctl: xch::Sender<Control>,
    snapshots: xch::Receiver<Snapshot>,
    ended: xch::Receiver<()>,
    actor: Option<JoinHandle<()>>,
}

impl core::fmt::Debug for EngineRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineRunner")
            .field("running", &self.actor.is_some())
            .field("queued_snapshots", &self.snapshots.len())
            .finish()
    }
}

impl EngineRunner {
    /// Validate `cfg`, start the sampler and the actor thread.
    pub fn spawn<A, C>(
        accel: A,
        cfg: EngineCfg,
        sampling: &SamplingCfg,
        mode: SamplingMode,
        clock: C,
    ) -> CoreResult<Self>
    where
        A: Accelerometer + Send + 'static,
        C: Clock + Clone + Send + Sync + 'static,
    {
        if sampling.sample_rate_hz == 0 {
            return Err(Report::new(crate::error::BuildError::InvalidConfig(
                "sample_rate_hz must be > 0",
            )));
        }
        let publish_ms = cfg.publish.interval_ms;
        let depth = cfg.publish.subscriber_depth;
        let mut engine = StrideEngine::builder().with_cfg(cfg).build()?;
        engine.begin(0);

        let period_ms = crate::util::period_ms(sampling.sample_rate_hz);
        let stall_threshold_ms =
            compute_stall_threshold_ms(sampling.read_timeout_ms, period_ms, publish_ms);
        let timeout = Duration::from_millis(sampling.read_timeout_ms);
        let sampler = match mode {
            SamplingMode::Event => {
                Sampler::spawn_event(accel, timeout, sampling.queue_depth, clock.clone())
            }
            SamplingMode::Paced(hz) => {
                Sampler::spawn(accel, hz, timeout, sampling.queue_depth, clock.clone())
            }
        };

        let (ctl_tx, ctl_rx) = xch::unbounded::<Control>();
        let (snap_tx, snap_rx) = xch::bounded::<Snapshot>(depth.max(1));
        let (ended_tx, ended_rx) = xch::bounded::<()>(1);

        tracing::info!(
            publish_ms,
            stall_threshold_ms,
            rate_hz = sampling.sample_rate_hz,
            ?mode,
            "engine runner start"
        );

        let actor = std::thread::Builder::new()
            .name("stride-engine".into())
            .spawn(move || {
                let actor = Actor {
                    engine,
                    sampler,
                    clock,
                    snap_tx,
                    ended_tx: Some(ended_tx),
                    stall_threshold_ms,
                    stalled: false,
                };
                actor.run(&ctl_rx, publish_ms);
            })
            .map_err(|e| Report::new(EngineError::State(format!("spawn actor: {e}"))))?;

        Ok(Self {
            ctl: ctl_tx,
            snapshots: snap_rx,
            ended: ended_rx,
            actor: Some(actor),
        })
    }

    /// Published snapshots, oldest first. Snapshots are dropped when this
    /// queue is full.
    pub fn snapshots(&self) -> &xch::Receiver<Snapshot> {
        &self.snapshots
    }

    /// Most recent published snapshot, if any has been published yet.
    pub fn latest(&self) -> CoreResult<Option<Snapshot>> {
        let (tx, rx) = xch::bounded(1);
        self.ctl
            .send(Control::Latest(tx))
            .map_err(|_| Report::new(EngineError::Stopped))?;
        rx.recv().map_err(|_| Report::new(EngineError::Stopped))
    }

    /// Point-in-time copy of the live state, outside the publish cadence.
    pub fn live(&self) -> CoreResult<Snapshot> {
        let (tx, rx) = xch::bounded(1);
        self.ctl
            .send(Control::Live(tx))
            .map_err(|_| Report::new(EngineError::Stopped))?;
        rx.recv().map_err(|_| Report::new(EngineError::Stopped))
    }

    /// Wait until the accelerometer reports end of stream and every queued
    /// sample has been ingested. Returns `false` on timeout.
    pub fn wait_for_end(&self, timeout: Duration) -> bool {
        match self.ended.recv_timeout(timeout) {
            Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => true,
            Err(xch::RecvTimeoutError::Timeout) => false,
        }
    }

    /// Stop the actor, join every thread and return a final live snapshot.
    pub fn shutdown(self) -> CoreResult<Snapshot> {
        self.finish().map(|r| r.snapshot)
    }

    /// Like `shutdown`, also returning the sample counters.
    pub fn finish(mut self) -> CoreResult<RunReport> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> CoreResult<RunReport> {
        let Some(handle) = self.actor.take() else {
            return Err(Report::new(EngineError::Stopped));
        };
        let (tx, rx) = xch::bounded(1);
        let sent = self.ctl.send(Control::Stop(tx)).is_ok();
        let report = if sent { rx.recv().ok() } else { None };
        if handle.join().is_err() {
            return Err(Report::new(EngineError::ActorPanicked));
        }
        report.ok_or_else(|| Report::new(EngineError::Stopped))
    }
}

impl Drop for EngineRunner {
    fn drop(&mut self) {
        if self.actor.is_none() {
            return;
        }
        if let Err(e) = self.stop_and_join() {
            tracing::warn!(error = %e, "engine runner did not stop cleanly");
        }
    }
}

struct Actor<C> {
    engine: StrideEngine,
    sampler: Sampler,
    clock: C,
    snap_tx: xch::Sender<Snapshot>,
    ended_tx: Option<xch::Sender<()>>,
    stall_threshold_ms: u64,
    stalled: bool,
}

impl<C: Clock> Actor<C> {
    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.sampler.epoch())
    }

    fn run(mut self, ctl: &xch::Receiver<Control>, publish_ms: u64) {
        let ticker = xch::tick(Duration::from_millis(publish_ms.max(1)));
        let mut samples = self.sampler.receiver();

        loop {
            let mut stream_closed = false;
            xch::select! {
                recv(samples) -> msg => match msg {
                    Ok(s) => {
                        if self.stalled {
                            tracing::info!(t_ms = s.timestamp_ms, "sensor delivering again");
                            self.stalled = false;
                        }
                        self.engine.ingest(&s);
                    }
                    Err(_) => stream_closed = true,
                },
                recv(ticker) -> _ => self.on_tick(),
                recv(ctl) -> msg => match msg {
                    Ok(Control::Latest(reply)) => {
                        let _ = reply.send(self.engine.latest_published().cloned());
                    }
                    Ok(Control::Live(reply)) => {
                        let _ = reply.send(self.engine.snapshot_at(self.now_ms()));
                    }
                    Ok(Control::Stop(reply)) => {
                        let snapshot = self.engine.snapshot_at(self.now_ms());
                        let stats = self.engine.stats();
                        tracing::info!(
                            steps = snapshot.steps,
                            samples = stats.samples(),
                            "engine runner stop"
                        );
                        let _ = reply.send(RunReport { snapshot, stats });
                        break;
                    }
                    Err(_) => {
                        tracing::debug!("runner handle dropped; actor exiting");
                        break;
                    }
                },
            }

            if stream_closed {
                samples = xch::never();
                tracing::info!(
                    steps = self.engine.totals().steps,
                    "sample stream closed"
                );
                if let Some(tx) = self.ended_tx.take() {
                    let _ = tx.try_send(());
                }
            }
        }
        // Dropping the sampler joins its thread.
        drop(self.sampler);
    }

    fn on_tick(&mut self) {
        let now = self.now_ms();
        let snap = self.engine.publish(now);
        match self.snap_tx.try_send(snap) {
            Ok(()) => {}
            Err(xch::TrySendError::Full(_)) => {
                tracing::debug!(t_ms = now, "snapshot subscriber lagging; dropped");
            }
            Err(xch::TrySendError::Disconnected(_)) => {}
        }

        if self.ended_tx.is_none() || self.stalled {
            return;
        }
        let stalled_ms = self.sampler.stalled_for(now);
        if stalled_now(now, stalled_ms, self.stall_threshold_ms) {
            tracing::warn!(
                stalled_ms,
                threshold_ms = self.stall_threshold_ms,
                "accelerometer stalled"
            );
            self.stalled = true;
        }
    }
}
