use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("engine runner is no longer running")]
    Stopped,
    #[error("engine actor panicked")]
    ActorPanicked,
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
