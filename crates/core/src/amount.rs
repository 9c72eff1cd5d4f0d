//! Monetary amount handling using `rust_decimal`.
//!
//! Amounts never pass through `f64`: JSON numbers are read through their
//! textual form, and every amount shown to a user or written back into a
//! slot is carried at two decimal places.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places used for every displayed amount.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to [`MONEY_SCALE`] places and pin its scale, so that
/// `12.5` displays as `12.50` and `550` as `550.00`.
pub fn money_scale(amount: Decimal) -> Decimal {
    let mut scaled = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    scaled.rescale(MONEY_SCALE);
    scaled
}

/// Render an amount the way notices show it (`"94.80"`).
pub fn format_money(amount: Decimal) -> String {
    money_scale(amount).to_string()
}

/// Divisions by ten after which any mantissa has rounded to zero.
const UNDERFLOW_SHIFT: u64 = 60;

/// Parse a textual amount (`"550"`, `" 12.50 "`, `"1e3"`).
///
/// Exponents too small for `Decimal` round toward zero instead of failing,
/// so `"1e-40"` reads as `0`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .or_else(|| parse_small_scientific(trimmed))
}

fn parse_small_scientific(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = text.split_once(|c: char| c == 'e' || c == 'E')?;
    let mantissa = Decimal::from_str(mantissa).ok()?;
    let exponent: i64 = exponent.parse().ok()?;
    if exponent >= 0 {
        return None;
    }
    let shift = exponent.unsigned_abs().min(UNDERFLOW_SHIFT);
    (0..shift).try_fold(mantissa, |acc, _| acc.checked_div(Decimal::TEN))
}

/// Read an amount from a JSON number or numeric string.
///
/// Numbers go through their decimal text so `35.95` stays exactly `35.95`.
pub fn amount_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => parse_amount(&n.to_string()),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}
