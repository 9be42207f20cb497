use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("accelerometer read timeout")]
    Timeout,
    #[error("sensor fault: {0}")]
    Fault(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SensorError>;
