//! Single-field reshaping helpers used while building player records.

use rust_decimal::prelude::{Decimal, ToPrimitive};
use rust_decimal::RoundingStrategy;

/// Rounding precision for rates computed on whole teams.
pub const DEFAULT_RATE_PRECISION: u32 = 2;

/// Returns `goals / shots` rounded to `precision` decimal places.
///
/// Zero shots yields `0.0`. Ties round half to even against the binary value
/// of the quotient, so `3 / 40` (stored as 0.07499...) rounds down to `0.07`.
pub fn conversion_rate(goals: i64, shots: i64, precision: u32) -> f64 {
    if shots == 0 {
        return 0.0;
    }
    let quotient = goals as f64 / shots as f64;
    match Decimal::from_f64_retain(quotient) {
        Some(exact) => exact
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
            .to_f64()
            .unwrap_or(quotient),
        None => quotient,
    }
}

/// Splits a squad label such as `"es Spain"` into `("ES", "Spain")`.
///
/// The first two characters are the country code; the name starts after the
/// separator at the third character.
pub fn split_squad(squad: &str) -> (String, String) {
    let code = squad.chars().take(2).collect::<String>().to_uppercase();
    let name = squad.chars().skip(3).collect();
    (code, name)
}

/// Swaps the comma between multiple positions for a pipe (`"MF,DF"` -> `"MF|DF"`)
/// so the value never needs quoting on output.
pub fn reformat_position(position: &str) -> String {
    position.replace(',', "|")
}

/// Renders a rate the way report consumers expect: whole values keep a single
/// decimal place (`0.0`), everything else uses the shortest exact form.
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{rate:.1}")
    } else {
        rate.to_string()
    }
}
