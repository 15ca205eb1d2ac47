//! Parsing of decimal amounts typed on the command line.

use crate::errors::{AppError, AppResult};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn parse_decimal(label: &str, s: &str) -> AppResult<Decimal> {
    Decimal::from_str(s.trim().replace(',', ".").as_str())
        .map_err(|_| AppError::validation(format!("invalid {label} '{s}'")))
}

pub fn parse_opt_decimal(label: &str, s: Option<&str>) -> AppResult<Option<Decimal>> {
    s.map(|v| parse_decimal(label, v)).transpose()
}
