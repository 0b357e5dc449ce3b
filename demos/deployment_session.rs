//! Deployment Session Example
//!
//! Plays the deployment collaborator against a simulated chain:
//! - Registers functions and creates triggers, recording receipt gas and latency
//! - Fires triggers, recording successes and reverted executions
//! - Drives a dashboard-style listener that prints every update
//! - Exports the session as JSON at the end
//!
//! Run with `RUST_LOG=livemetrics=debug` to see the store's own diagnostics.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{fmt, EnvFilter};

use livemetrics::{
    config, format_eth, format_gas, format_gas_units, format_percentage, format_time,
    ExecutionInput, JsonExporter, MetricsError, MetricsSnapshot, MetricsStore,
};

const SESSION_CONFIG: &str = r#"
recent_window: 5
history_capacity: 500
initial_gas_price: 50000000000
"#;

// ============================================================================
// Simulated Chain
// ============================================================================

/// Receipt returned by the simulated chain
struct Receipt {
    tx_hash: String,
    gas_used: u128,
    status: u8,
}

/// Stand-in for the registry contract behind a JSON-RPC provider
struct SimulatedChain {
    rng: ChaCha8Rng,
    nonce: u64,
}

impl SimulatedChain {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            nonce: 0,
        }
    }

    fn send(&mut self, base_gas: u128, revert_probability: f64) -> Result<Receipt, String> {
        self.nonce += 1;
        if self.rng.gen_bool(0.05) {
            return Err("request timed out".to_string());
        }
        let reverted = self.rng.gen_bool(revert_probability);
        Ok(Receipt {
            tx_hash: format!("0x{:064x}", self.rng.gen::<u64>() ^ self.nonce),
            gas_used: base_gas + self.rng.gen_range(0..5_000),
            status: if reverted { 0 } else { 1 },
        })
    }
}

// ============================================================================
// Deployment Collaborator
// ============================================================================

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}

fn register_function(chain: &mut SimulatedChain, store: &mut MetricsStore) -> Option<u64> {
    let start = Instant::now();
    match chain.send(180_000, 0.0) {
        Ok(receipt) => {
            store.record_function_registration(receipt.gas_used, elapsed_ms(start));
            Some(chain.nonce)
        }
        Err(e) => {
            tracing::warn!(error = %e, "function registration failed");
            None
        }
    }
}

fn create_trigger(chain: &mut SimulatedChain, store: &mut MetricsStore) -> Option<u64> {
    let start = Instant::now();
    match chain.send(95_000, 0.0) {
        Ok(receipt) => {
            store.record_trigger_creation(receipt.gas_used, elapsed_ms(start));
            Some(chain.nonce)
        }
        Err(e) => {
            tracing::warn!(error = %e, "trigger creation failed");
            None
        }
    }
}

fn fire_trigger(
    chain: &mut SimulatedChain,
    store: &mut MetricsStore,
    function_id: u64,
    trigger_id: u64,
) {
    let start = Instant::now();
    let input = match chain.send(48_000, 0.15) {
        Ok(receipt) if receipt.status == 1 => ExecutionInput::success(
            function_id,
            trigger_id,
            receipt.tx_hash,
            receipt.gas_used,
            elapsed_ms(start),
        ),
        Ok(receipt) => ExecutionInput::failure(
            function_id,
            trigger_id,
            receipt.tx_hash,
            receipt.gas_used,
            elapsed_ms(start),
            "execution reverted",
        ),
        Err(e) => ExecutionInput::failure(function_id, trigger_id, "", 0, 0.0, e),
    };
    store.record_execution(input);
}

// ============================================================================
// Dashboard Listener
// ============================================================================

fn render(m: &MetricsSnapshot) -> String {
    format!(
        "fns={} triggers={} execs={} ok={} gas={} avg/exec={} cost={} avg time={}",
        m.execution.total_functions,
        m.execution.total_triggers,
        m.execution.total_executions,
        format_percentage(m.execution.success_rate),
        format_gas_units(m.gas.total_gas_used),
        format_gas(m.gas.avg_gas_per_execution),
        format_eth(m.gas.total_cost_eth),
        format_time(m.timing.avg_time_per_execution),
    )
}

fn main() -> Result<(), MetricsError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_str(SESSION_CONFIG)?;
    let mut store = MetricsStore::with_config(cfg)?;
    let mut chain = SimulatedChain::new(2024);

    let updates = Rc::new(Cell::new(0u32));
    let counter = updates.clone();
    let panel = store.subscribe(move |m| {
        counter.set(counter.get() + 1);
        println!("[update {:>3}] {}", counter.get(), render(m));
    });

    let functions: Vec<u64> = (0..3)
        .filter_map(|_| register_function(&mut chain, &mut store))
        .collect();
    let mut pairs = Vec::new();
    for function_id in &functions {
        if let Some(trigger_id) = create_trigger(&mut chain, &mut store) {
            pairs.push((*function_id, trigger_id));
        }
    }

    for round in 0..20 {
        if let Some((function_id, trigger_id)) = pairs.get(round % pairs.len().max(1)) {
            fire_trigger(&mut chain, &mut store, *function_id, *trigger_id);
        }
        if round == 10 {
            store.update_gas_price(65_000_000_000);
        }
    }

    panel.unsubscribe();

    let snapshot = store.metrics();
    println!();
    println!("Recent executions:");
    for record in &snapshot.recent_executions {
        println!(
            "  {} fn={} trigger={} gas={} {}",
            record.id,
            record.function_id,
            record.trigger_id,
            format_gas_units(record.gas_used),
            record.error_message.as_deref().unwrap_or("ok"),
        );
    }

    let bytes = store.export_with(&JsonExporter::new_pretty())?;
    println!();
    println!(
        "Exported {} bytes after {} listener updates",
        bytes.len(),
        updates.get()
    );

    Ok(())
}
