//! Outcome of feeding one raw sample to the engine.

/// A confirmed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Sample timestamp (ms since session epoch) at which the step fired.
    pub timestamp_ms: u64,
    /// Cumulative step count including this step.
    pub total_steps: u64,
}

/// Why a sample was dropped before touching any detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// At least one axis was NaN or infinite.
    NonFinite,
    /// Linear magnitude exceeded the shake limit.
    OverLimit,
}

/// Public status of a single `ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Sample accepted; no step.
    Idle,
    /// Sample accepted and a step fired.
    Step(StepEvent),
    /// Sample dropped.
    Rejected(RejectReason),
}

impl IngestOutcome {
    #[inline]
    pub fn step(&self) -> Option<StepEvent> {
        match self {
            Self::Step(ev) => Some(*ev),
            _ => None,
        }
    }
}
