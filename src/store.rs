//! Metrics accumulation, derivation and live notification

use std::collections::VecDeque;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{ConfigError, ExportError, ValidationError};
use crate::export::Exporter;
use crate::ids::IdGenerator;
use crate::subscribers::{SubscriberRegistry, Subscription};
use crate::traits::{validate_duration, Validate};
use crate::types::{
    ExecutionInput, ExecutionMetrics, ExecutionRecord, GasMetrics, MetricsExport,
    MetricsSnapshot, TimingMetrics,
};
use crate::units::{average_f64, average_u128, cost_ether};

/// Registration and trigger counters fed by explicit events
#[derive(Debug, Clone, Copy, Default)]
struct SetupTotals {
    functions: u64,
    triggers: u64,
    registration_gas: u128,
    trigger_gas: u128,
    registration_time: f64,
    trigger_setup_time: f64,
}

/// In-memory aggregator of execution, gas and timing statistics
///
/// Every mutating call recomputes the snapshot from the execution log and
/// counters, then hands it to each listener in registration order. Callers
/// only ever see clones of the snapshot.
pub struct MetricsStore {
    config: StoreConfig,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
    history: VecDeque<ExecutionRecord>,
    setup: SetupTotals,
    gas_price: u128,
    session_start: i64,
    snapshot: MetricsSnapshot,
    subscribers: SubscriberRegistry,
}

impl MetricsStore {
    /// Create a store with the default configuration and the system clock
    pub fn new() -> Self {
        let config = StoreConfig::default();
        let ids = IdGenerator::new(config.id_prefix.clone());
        Self::from_parts(config, Box::new(SystemClock), ids)
    }

    /// Create a store from a configuration, rejecting out-of-range values
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> MetricsStoreBuilder {
        MetricsStoreBuilder::new()
    }

    fn from_parts(config: StoreConfig, clock: Box<dyn Clock>, ids: IdGenerator) -> Self {
        let now = clock.now_millis();
        let mut store = Self {
            gas_price: config.initial_gas_price,
            history: VecDeque::new(),
            config,
            clock,
            ids,
            setup: SetupTotals::default(),
            session_start: now,
            snapshot: MetricsSnapshot::default(),
            subscribers: SubscriberRegistry::new(),
        };
        store.snapshot = store.derive();
        store
    }

    /// Count a function registration and its receipt gas
    pub fn record_function_registration(&mut self, gas_used: u128, execution_time_ms: f64) {
        self.setup.functions += 1;
        self.setup.registration_gas = self.setup.registration_gas.saturating_add(gas_used);
        self.setup.registration_time += execution_time_ms;

        tracing::debug!(
            total_functions = self.setup.functions,
            gas_used = %gas_used,
            execution_time_ms,
            "function registration recorded"
        );
        self.publish();
    }

    /// Count a trigger creation and its receipt gas
    pub fn record_trigger_creation(&mut self, gas_used: u128, execution_time_ms: f64) {
        self.setup.triggers += 1;
        self.setup.trigger_gas = self.setup.trigger_gas.saturating_add(gas_used);
        self.setup.trigger_setup_time += execution_time_ms;

        tracing::debug!(
            total_triggers = self.setup.triggers,
            gas_used = %gas_used,
            execution_time_ms,
            "trigger creation recorded"
        );
        self.publish();
    }

    /// Append an execution to the log and return the stored record
    pub fn record_execution(&mut self, input: ExecutionInput) -> ExecutionRecord {
        let id = self.ids.next_id(self.clock.now_millis());
        let record = input.into_record(id);

        tracing::debug!(
            id = %record.id,
            function_id = record.function_id,
            trigger_id = record.trigger_id,
            success = record.success,
            gas_used = %record.gas_used,
            "execution recorded"
        );

        self.history.push_back(record.clone());
        if let Some(capacity) = self.config.history_capacity {
            while self.history.len() > capacity {
                if let Some(evicted) = self.history.pop_front() {
                    tracing::trace!(id = %evicted.id, capacity, "execution evicted from history");
                }
            }
        }

        self.publish();
        record
    }

    /// Replace the gas price used for cost projection
    pub fn update_gas_price(&mut self, gas_price: u128) {
        tracing::debug!(gas_price = %gas_price, previous = %self.gas_price, "gas price updated");
        self.gas_price = gas_price;
        self.publish();
    }

    /// Validate, then record a function registration
    pub fn try_record_function_registration(
        &mut self,
        gas_used: u128,
        execution_time_ms: f64,
    ) -> Result<(), ValidationError> {
        if let Err(e) = validate_duration("execution_time_ms", execution_time_ms) {
            tracing::warn!(error = %e, "function registration rejected");
            return Err(e);
        }
        self.record_function_registration(gas_used, execution_time_ms);
        Ok(())
    }

    /// Validate, then record a trigger creation
    pub fn try_record_trigger_creation(
        &mut self,
        gas_used: u128,
        execution_time_ms: f64,
    ) -> Result<(), ValidationError> {
        if let Err(e) = validate_duration("execution_time_ms", execution_time_ms) {
            tracing::warn!(error = %e, "trigger creation rejected");
            return Err(e);
        }
        self.record_trigger_creation(gas_used, execution_time_ms);
        Ok(())
    }

    /// Validate, then record an execution; state is untouched on rejection
    pub fn try_record_execution(
        &mut self,
        input: ExecutionInput,
    ) -> Result<ExecutionRecord, ValidationError> {
        if let Err(e) = input.validate() {
            tracing::warn!(
                function_id = input.function_id,
                trigger_id = input.trigger_id,
                error = %e,
                "execution rejected"
            );
            return Err(e);
        }
        Ok(self.record_execution(input))
    }

    /// Independent copy of the current snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.snapshot.clone()
    }

    /// Register a listener for every future snapshot
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&MetricsSnapshot) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Clear history, counters and accumulators and restart the session clock
    ///
    /// The gas price returns to the configured initial value. Listeners stay
    /// registered and receive the empty snapshot.
    pub fn reset(&mut self) {
        tracing::info!(
            executions = self.history.len(),
            functions = self.setup.functions,
            triggers = self.setup.triggers,
            "metrics reset"
        );

        self.history.clear();
        self.setup = SetupTotals::default();
        self.gas_price = self.config.initial_gas_price;
        self.session_start = self.clock.now_millis();
        self.publish();
    }

    /// Snapshot plus the retained execution log
    pub fn export(&self) -> MetricsExport {
        MetricsExport {
            metrics: self.metrics(),
            execution_history: self.history.iter().cloned().collect(),
            exported_at: self.clock.now(),
        }
    }

    /// Export encoded with the given exporter
    pub fn export_with<E: Exporter>(&self, exporter: &E) -> Result<Vec<u8>, ExportError> {
        let export = self.export();
        let bytes = exporter.encode(&export)?;
        tracing::debug!(
            format = exporter.name(),
            bytes = bytes.len(),
            records = export.execution_history.len(),
            "metrics exported"
        );
        Ok(bytes)
    }

    /// Retained execution log, oldest first
    pub fn execution_history(&self) -> impl ExactSizeIterator<Item = &ExecutionRecord> + '_ {
        self.history.iter()
    }

    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn publish(&mut self) {
        self.snapshot = self.derive();
        self.subscribers.notify(&self.snapshot);
    }

    /// Recompute every derived field from the log and counters
    fn derive(&self) -> MetricsSnapshot {
        let now = self.clock.now_millis();
        let setup = self.setup;

        let total_executions = self.history.len() as u64;
        let successful_executions = self.history.iter().filter(|e| e.success).count() as u64;
        let failed_executions = total_executions - successful_executions;
        let (success_rate, failure_rate) = if total_executions > 0 {
            let rate = successful_executions as f64 / total_executions as f64 * 100.0;
            (rate, 100.0 - rate)
        } else {
            (0.0, 0.0)
        };

        let total_gas_used = self
            .history
            .iter()
            .fold(0u128, |sum, e| sum.saturating_add(e.gas_used));
        let total_cost_eth = cost_ether(total_gas_used, self.gas_price);

        let execution_time: f64 = self.history.iter().map(|e| e.execution_time_ms).sum();
        let avg_time_per_execution = average_f64(execution_time, total_executions);

        let recent_executions = self
            .history
            .iter()
            .rev()
            .take(self.config.recent_window)
            .cloned()
            .collect();

        MetricsSnapshot {
            execution: ExecutionMetrics {
                total_functions: setup.functions,
                total_triggers: setup.triggers,
                total_executions,
                successful_executions,
                failed_executions,
                total_gas_used,
                total_cost_eth,
                average_execution_time: avg_time_per_execution,
                success_rate,
                failure_rate,
            },
            gas: GasMetrics {
                total_gas_used,
                total_cost_eth,
                avg_gas_per_function: average_u128(setup.registration_gas, setup.functions),
                avg_gas_per_trigger: average_u128(setup.trigger_gas, setup.triggers),
                avg_gas_per_execution: average_u128(total_gas_used, total_executions),
                gas_price: self.gas_price,
                registration_gas_used: setup.registration_gas,
                trigger_gas_used: setup.trigger_gas,
            },
            timing: TimingMetrics {
                total_time: (now - self.session_start) as f64,
                avg_time_per_function: average_f64(setup.registration_time, setup.functions),
                avg_time_per_trigger: average_f64(setup.trigger_setup_time, setup.triggers),
                avg_time_per_execution,
                registration_time: setup.registration_time,
                trigger_setup_time: setup.trigger_setup_time,
                execution_time,
            },
            recent_executions,
            last_updated: now,
        }
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsStore")
            .field("config", &self.config)
            .field("history", &self.history.len())
            .field("gas_price", &self.gas_price)
            .field("session_start", &self.session_start)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Builder for constructing a metrics store
pub struct MetricsStoreBuilder {
    config: StoreConfig,
    clock: Option<Box<dyn Clock>>,
    seed: Option<u64>,
}

impl MetricsStoreBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            clock: None,
            seed: None,
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific time source instead of the system clock
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Seed the id generator for reproducible ids
    pub fn id_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and assemble the store
    pub fn build(self) -> Result<MetricsStore, ConfigError> {
        self.config.validate()?;
        let ids = match self.seed {
            Some(seed) => IdGenerator::with_seed(self.config.id_prefix.clone(), seed),
            None => IdGenerator::new(self.config.id_prefix.clone()),
        };
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        Ok(MetricsStore::from_parts(self.config, clock, ids))
    }
}

impl Default for MetricsStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_at(millis: i64) -> (MetricsStore, ManualClock) {
        let clock = ManualClock::new(millis);
        let store = MetricsStore::builder()
            .clock(clock.clone())
            .id_seed(1)
            .build()
            .unwrap();
        (store, clock)
    }

    #[test]
    fn test_empty_store() {
        let (store, _) = store_at(1_000);
        let m = store.metrics();

        assert_eq!(m.execution.total_executions, 0);
        assert_eq!(m.execution.success_rate, 0.0);
        assert_eq!(m.execution.failure_rate, 0.0);
        assert_eq!(m.gas.avg_gas_per_execution, 0.0);
        assert_eq!(m.timing.avg_time_per_execution, 0.0);
        assert_eq!(m.last_updated, 1_000);
    }

    #[test]
    fn test_record_execution_assigns_id() {
        let (mut store, _) = store_at(1_700_000_000_000);
        let record = store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));

        assert!(record.id.starts_with("exec_1700000000000_"));
        assert_eq!(store.metrics().recent_executions[0], record);
    }

    #[test]
    fn test_registration_gas_does_not_leak_into_execution_total() {
        let (mut store, _) = store_at(0);
        store.record_function_registration(1_000, 500.0);
        store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));

        let m = store.metrics();
        assert_eq!(m.gas.total_gas_used, 100);
        assert_eq!(m.gas.registration_gas_used, 1_000);
        assert_eq!(m.gas.avg_gas_per_function, 1_000.0);
    }

    #[test]
    fn test_execution_mirrors_gas_and_timing() {
        let (mut store, _) = store_at(0);
        store.update_gas_price(10);
        store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));
        store.record_execution(ExecutionInput::success(1, 1, "0x02", 300, 30.0));

        let m = store.metrics();
        assert_eq!(m.execution.total_gas_used, m.gas.total_gas_used);
        assert_eq!(m.execution.total_cost_eth, m.gas.total_cost_eth);
        assert_eq!(m.execution.average_execution_time, 20.0);
        assert_eq!(m.timing.execution_time, 40.0);
    }

    #[test]
    fn test_total_time_tracks_clock() {
        let (mut store, clock) = store_at(10_000);
        clock.advance(2_500);
        store.update_gas_price(1);

        let m = store.metrics();
        assert_eq!(m.timing.total_time, 2_500.0);
        assert_eq!(m.last_updated, 12_500);
    }

    #[test]
    fn test_metrics_is_a_copy() {
        let (mut store, _) = store_at(0);
        store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));

        let mut copy = store.metrics();
        copy.execution.total_executions = 99;
        copy.recent_executions.clear();

        let fresh = store.metrics();
        assert_eq!(fresh.execution.total_executions, 1);
        assert_eq!(fresh.recent_executions.len(), 1);
    }

    #[test]
    fn test_try_record_execution_leaves_state_on_rejection() {
        let (mut store, _) = store_at(0);
        let notified = Rc::new(RefCell::new(0));
        let counter = notified.clone();
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        let mut bad = ExecutionInput::failure(1, 1, "", 0, 0.0, "reverted");
        bad.error_message = None;

        assert!(store.try_record_execution(bad).is_err());
        assert_eq!(store.metrics().execution.total_executions, 0);
        assert_eq!(*notified.borrow(), 0);
    }

    #[test]
    fn test_try_record_registration_rejects_negative_time() {
        let (mut store, _) = store_at(0);
        assert!(store.try_record_function_registration(1_000, -1.0).is_err());
        assert!(store.try_record_trigger_creation(1_000, f64::NAN).is_err());
        assert!(store.try_record_function_registration(1_000, 1.0).is_ok());

        let m = store.metrics();
        assert_eq!(m.execution.total_functions, 1);
        assert_eq!(m.execution.total_triggers, 0);
    }

    #[test]
    fn test_permissive_record_accepts_anything() {
        let (mut store, _) = store_at(0);
        store.record_function_registration(0, -5.0);
        let mut odd = ExecutionInput::success(1, 1, "", 0, -1.0);
        odd.error_message = Some("ignored".to_string());
        store.record_execution(odd);

        let m = store.metrics();
        assert_eq!(m.execution.total_functions, 1);
        assert_eq!(m.timing.avg_time_per_function, -5.0);
        assert_eq!(m.execution.total_executions, 1);
    }

    #[test]
    fn test_reset_restores_initial_gas_price() {
        let clock = ManualClock::new(0);
        let config = StoreConfig::default().with_initial_gas_price(7);
        let mut store = MetricsStore::builder()
            .config(config)
            .clock(clock)
            .build()
            .unwrap();

        store.update_gas_price(100);
        assert_eq!(store.gas_price(), 100);

        store.reset();
        assert_eq!(store.gas_price(), 7);
        assert_eq!(store.metrics().gas.gas_price, 7);
    }

    #[test]
    fn test_custom_recent_window() {
        let config = StoreConfig {
            recent_window: 3,
            ..StoreConfig::default()
        };
        let mut store = MetricsStore::builder()
            .config(config)
            .clock(ManualClock::new(0))
            .build()
            .unwrap();
        for i in 0..5u64 {
            store.record_execution(ExecutionInput::success(i, i, "0x01", 1, 1.0));
        }

        let recent = store.metrics().recent_executions;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].function_id, 4);
        assert_eq!(recent[2].function_id, 2);
    }

    #[test]
    fn test_export_contains_history() {
        let (mut store, _) = store_at(1_714_564_800_000);
        store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));
        store.record_execution(ExecutionInput::failure(1, 1, "", 0, 0.0, "timeout"));

        let export = store.export();
        assert_eq!(export.execution_history.len(), 2);
        assert_eq!(export.execution_history[0].tx_hash, "0x01");
        assert_eq!(export.metrics, store.metrics());
        assert_eq!(export.exported_at.timestamp_millis(), 1_714_564_800_000);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = StoreConfig {
            recent_window: 0,
            history_capacity: Some(0),
            ..StoreConfig::default()
        };
        let err = MetricsStore::builder()
            .config(config.clone())
            .clock(ManualClock::new(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert!(MetricsStore::with_config(config).is_err());
    }

    #[test]
    fn test_large_history_capacity_is_not_preallocated() {
        let config = StoreConfig::default().with_history_capacity(1_000_000_000_000_000_000);
        let mut store = MetricsStore::builder()
            .config(config)
            .clock(ManualClock::new(0))
            .build()
            .unwrap();
        store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 10.0));

        assert_eq!(store.metrics().execution.total_executions, 1);
        assert_eq!(store.execution_history().len(), 1);
    }
}
