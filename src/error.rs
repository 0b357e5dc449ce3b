//! Error types for the metrics store

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Inconsistent outcome: {reason}")]
    InconsistentOutcome { reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse failed: {reason}")]
    Parse { reason: String },

    #[error("Config value out of range: {field} - {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Config read failed: {reason}")]
    Io { reason: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization failed: {reason}")]
    SerializationFailed { reason: String },

    #[error("Deserialization failed: {reason}")]
    DeserializationFailed { reason: String },
}
