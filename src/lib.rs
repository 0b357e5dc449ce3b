//! Live execution metrics for serverless-function deployments
//!
//! An in-memory store that accumulates function registrations, trigger
//! creations and execution results, derives execution/gas/timing statistics
//! after every write and pushes the fresh snapshot to subscribed listeners.

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod ids;
pub mod store;
pub mod subscribers;
pub mod traits;
pub mod types;
pub mod units;

// Re-export core types and traits
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{ConfigError, ExportError, MetricsError, ValidationError};
pub use export::{BincodeExporter, Exporter, JsonExporter};
pub use format::{format_eth, format_gas, format_gas_units, format_percentage, format_time};
pub use ids::IdGenerator;
pub use store::{MetricsStore, MetricsStoreBuilder};
pub use subscribers::{Listener, SubscriberId, SubscriberRegistry, Subscription};
pub use traits::Validate;
pub use types::{
    ExecutionInput, ExecutionMetrics, ExecutionRecord, GasMetrics, MetricsExport,
    MetricsSnapshot, TimingMetrics,
};
pub use units::{cost_ether, cost_wei, wei_to_ether, WEI_PER_ETHER};
