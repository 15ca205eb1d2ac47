//! Formatting utilities used for CLI and export outputs.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to 2 decimal places, half away from zero.
pub fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Hours and money are always rendered with two decimals.
pub fn fmt2(d: Decimal) -> String {
    format!("{:.2}", round2(d))
}

pub fn fmt2_opt(d: Option<Decimal>) -> String {
    d.map(fmt2).unwrap_or_else(|| "--".to_string())
}

/// Like `fmt2` with an explicit `+` on positive values.
pub fn fmt2_signed(d: Decimal) -> String {
    if d > Decimal::ZERO {
        format!("+{}", fmt2(d))
    } else {
        fmt2(d)
    }
}

pub fn opt_text(s: Option<&str>) -> String {
    s.filter(|v| !v.trim().is_empty())
        .unwrap_or("--")
        .to_string()
}
