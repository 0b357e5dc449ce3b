//! Denomination conversion for gas costs

/// Wei in one ether
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Exact cost in wei of `gas` units at `gas_price` wei each
///
/// Saturates at `u128::MAX` instead of wrapping.
pub fn cost_wei(gas: u128, gas_price: u128) -> u128 {
    gas.saturating_mul(gas_price)
}

/// Convert wei to ether for display
///
/// The integer and fractional parts are split before going to floating
/// point, so small amounts keep all their significant digits.
pub fn wei_to_ether(wei: u128) -> f64 {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    whole as f64 + frac as f64 / WEI_PER_ETHER as f64
}

/// Ether cost of `gas` units at `gas_price`
pub fn cost_ether(gas: u128, gas_price: u128) -> f64 {
    wei_to_ether(cost_wei(gas, gas_price))
}

/// Average of an exact integer total over `count`, 0 when `count` is 0
pub(crate) fn average_u128(total: u128, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let whole = total / count as u128;
    let rem = total % count as u128;
    whole as f64 + rem as f64 / count as f64
}

/// Average of a float total over `count`, 0 when `count` is 0
pub(crate) fn average_f64(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
