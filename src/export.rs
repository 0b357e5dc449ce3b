//! Pluggable serialization for metric exports

use crate::error::ExportError;
use crate::types::MetricsExport;

/// Trait for pluggable export encodings
pub trait Exporter {
    /// Encode an export to bytes
    fn encode(&self, export: &MetricsExport) -> Result<Vec<u8>, ExportError>;

    /// Decode an export previously produced by `encode`
    fn decode(&self, bytes: &[u8]) -> Result<MetricsExport, ExportError>;

    /// Name of this encoding
    fn name(&self) -> &str;

    /// Conventional file extension for this encoding
    fn extension(&self) -> &str;
}

/// JSON export, optionally pretty-printed
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn new_pretty() -> Self {
        Self { pretty: true }
    }
}

impl Exporter for JsonExporter {
    fn encode(&self, export: &MetricsExport) -> Result<Vec<u8>, ExportError> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(export)
        } else {
            serde_json::to_vec(export)
        };

        result.map_err(|e| ExportError::SerializationFailed {
            reason: format!("JSON serialization failed: {}", e),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<MetricsExport, ExportError> {
        serde_json::from_slice(bytes).map_err(|e| ExportError::DeserializationFailed {
            reason: format!("JSON deserialization failed: {}", e),
        })
    }

    fn name(&self) -> &str {
        "json"
    }

    fn extension(&self) -> &str {
        "json"
    }
}

/// Compact binary export
#[derive(Debug, Clone, Default)]
pub struct BincodeExporter;

impl BincodeExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for BincodeExporter {
    fn encode(&self, export: &MetricsExport) -> Result<Vec<u8>, ExportError> {
        bincode::serialize(export).map_err(|e| ExportError::SerializationFailed {
            reason: format!("Bincode serialization failed: {}", e),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<MetricsExport, ExportError> {
        bincode::deserialize(bytes).map_err(|e| ExportError::DeserializationFailed {
            reason: format!("Bincode deserialization failed: {}", e),
        })
    }

    fn name(&self) -> &str {
        "bincode"
    }

    fn extension(&self) -> &str {
        "bin"
    }
}
