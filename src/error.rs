use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),
    #[error("Channel error: {0}")]
    ChannelError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
