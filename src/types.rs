//! Core data types for the metrics store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::traits::{validate_duration, Validate};

/// One observed function invocation, as stored in the execution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub function_id: u64,
    pub trigger_id: u64,
    /// Transaction hash; empty when the failure never reached the chain
    pub tx_hash: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
    pub gas_used: u128,
    pub success: bool,
    pub execution_time_ms: f64,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// An execution record before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInput {
    pub function_id: u64,
    pub trigger_id: u64,
    pub tx_hash: String,
    pub timestamp: i64,
    pub gas_used: u128,
    pub success: bool,
    pub execution_time_ms: f64,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ExecutionInput {
    /// Input for an execution whose receipt reported success
    pub fn success(
        function_id: u64,
        trigger_id: u64,
        tx_hash: impl Into<String>,
        gas_used: u128,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            function_id,
            trigger_id,
            tx_hash: tx_hash.into(),
            timestamp: Utc::now().timestamp_millis(),
            gas_used,
            success: true,
            execution_time_ms,
            error_message: None,
        }
    }

    /// Input for a failed execution
    pub fn failure(
        function_id: u64,
        trigger_id: u64,
        tx_hash: impl Into<String>,
        gas_used: u128,
        execution_time_ms: f64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            function_id,
            trigger_id,
            tx_hash: tx_hash.into(),
            timestamp: Utc::now().timestamp_millis(),
            gas_used,
            success: false,
            execution_time_ms,
            error_message: Some(error_message.into()),
        }
    }

    /// Override the creation instant (milliseconds since epoch)
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach an id, producing the stored form
    pub fn into_record(self, id: String) -> ExecutionRecord {
        ExecutionRecord {
            id,
            function_id: self.function_id,
            trigger_id: self.trigger_id,
            tx_hash: self.tx_hash,
            timestamp: self.timestamp,
            gas_used: self.gas_used,
            success: self.success,
            execution_time_ms: self.execution_time_ms,
            error_message: self.error_message,
        }
    }
}

impl Validate for ExecutionInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_duration("execution_time_ms", self.execution_time_ms)?;

        if self.timestamp < 0 {
            return Err(ValidationError::InvalidInput {
                field: "timestamp".to_string(),
                reason: format!("timestamp cannot precede the epoch, got {}", self.timestamp),
            });
        }

        match (self.success, self.error_message.as_deref()) {
            (true, Some(_)) => Err(ValidationError::InconsistentOutcome {
                reason: "successful execution carries an error message".to_string(),
            }),
            (false, None) => Err(ValidationError::InconsistentOutcome {
                reason: "failed execution has no error message".to_string(),
            }),
            (true, None) if self.tx_hash.is_empty() => Err(ValidationError::InvalidInput {
                field: "tx_hash".to_string(),
                reason: "successful execution must reference a transaction".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Execution counters and rates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub total_functions: u64,
    pub total_triggers: u64,
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub total_gas_used: u128,
    pub total_cost_eth: f64,
    pub average_execution_time: f64,
    pub success_rate: f64,
    pub failure_rate: f64,
}

/// Gas totals, per-category averages and the price used for cost projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasMetrics {
    /// Sum of `gas_used` over the execution log
    pub total_gas_used: u128,
    pub total_cost_eth: f64,
    pub avg_gas_per_function: f64,
    pub avg_gas_per_trigger: f64,
    pub avg_gas_per_execution: f64,
    /// Wei per unit of gas
    pub gas_price: u128,
    pub registration_gas_used: u128,
    pub trigger_gas_used: u128,
}

/// Wall-clock and per-category timing, all in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingMetrics {
    /// Elapsed since the session started (construction or last reset)
    pub total_time: f64,
    pub avg_time_per_function: f64,
    pub avg_time_per_trigger: f64,
    pub avg_time_per_execution: f64,
    pub registration_time: f64,
    pub trigger_setup_time: f64,
    pub execution_time: f64,
}

/// Fully derived, consistent view of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub execution: ExecutionMetrics,
    pub gas: GasMetrics,
    pub timing: TimingMetrics,
    /// Newest first
    pub recent_executions: Vec<ExecutionRecord>,
    pub last_updated: i64,
}

/// Snapshot plus the full retained log, for offline analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsExport {
    pub metrics: MetricsSnapshot,
    pub execution_history: Vec<ExecutionRecord>,
    pub exported_at: DateTime<Utc>,
}
