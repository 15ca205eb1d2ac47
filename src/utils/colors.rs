/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

use rust_decimal::Decimal;

/// Signed value color:
/// \>0 → green
/// \<0 → red
/// 0 → reset
pub fn color_for_signed(value: Decimal) -> &'static str {
    if value > Decimal::ZERO {
        GREEN
    } else if value < Decimal::ZERO {
        RED
    } else {
        RESET
    }
}

pub fn colorize_signed(value: Decimal, rendered: &str) -> String {
    format!("{}{}{}", color_for_signed(value), rendered, RESET)
}
