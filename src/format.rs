//! Human-readable rendering of metric values
//!
//! Pure functions with no state. Thresholds follow the dashboard panels:
//! gas is abbreviated with K/M/B suffixes, ether falls back to wei below
//! 0.001, durations switch units at one second and one minute.

use crate::units::WEI_PER_ETHER;

/// Abbreviate a gas amount
pub fn format_gas(gas: f64) -> String {
    if gas >= 1e9 {
        format!("{:.2}B", gas / 1e9)
    } else if gas >= 1e6 {
        format!("{:.2}M", gas / 1e6)
    } else if gas >= 1e3 {
        format!("{:.2}K", gas / 1e3)
    } else {
        group_thousands(gas)
    }
}

/// Abbreviate an exact gas amount
pub fn format_gas_units(gas: u128) -> String {
    format_gas(gas as f64)
}

/// Render an ether amount, switching to wei for dust
pub fn format_eth(eth: f64) -> String {
    if eth >= 1.0 {
        format!("{:.4} ETH", eth)
    } else if eth >= 0.001 {
        format!("{:.6} ETH", eth)
    } else {
        format!("{:.0} wei", eth * WEI_PER_ETHER as f64)
    }
}

/// Render a millisecond duration as ms, s or m
pub fn format_time(ms: f64) -> String {
    if ms >= 60_000.0 {
        format!("{:.1}m", ms / 60_000.0)
    } else if ms >= 1_000.0 {
        format!("{:.1}s", ms / 1_000.0)
    } else {
        format!("{:.0}ms", ms)
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Plain number with comma grouping and at most three decimals
fn group_thousands(value: f64) -> String {
    let rendered = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
