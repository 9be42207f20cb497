#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core step-detection engine (sensor-agnostic).
//!
//! Raw samples flow through a fixed pipeline:
//!
//! - **Gravity**: per-axis low-pass separating gravity from motion (`gravity`)
//! - **Motion**: total, horizontal and vertical linear magnitudes (`motion`)
//! - **Detector**: smoothing window, horizontal gate, adaptive threshold and
//!   debounce (`detector`)
//! - **Metrics**: per-session running totals (`metrics`)
//! - **History**: 5 s interval buckets in a bounded FIFO (`history`)
//! - **Snapshot**: throttled copies for consumers (`snapshot`)
//!
//! `StrideEngine` owns all of it and is driven either directly
//! (`ingest` + `publish_if_due`, as offline replay does) or by an
//! `EngineRunner` actor fed from a `Sampler` thread.
//!
//! All sensor access goes through `stride_traits::Accelerometer`.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod engine;
pub mod error;
pub mod gravity;
pub mod history;
pub mod metrics;
pub mod mocks;
pub mod motion;
pub mod runner;
pub mod sampler;
pub mod snapshot;
pub mod status;
pub mod util;

pub use builder::EngineBuilder;
pub use config::{
    DetectorCfg, EngineCfg, GravityCfg, HistoryCfg, MetricsCfg, PublishCfg, SamplingCfg,
};
pub use engine::{IngestStats, RawSample, StrideEngine};
pub use error::{BuildError, EngineError, Result};
pub use gravity::GravityEstimate;
pub use history::{IntervalHistory, IntervalRecord};
pub use metrics::Accumulators;
pub use motion::MotionComponents;
pub use runner::{EngineRunner, RunReport, SamplingMode};
pub use snapshot::Snapshot;
pub use status::{IngestOutcome, RejectReason, StepEvent};
