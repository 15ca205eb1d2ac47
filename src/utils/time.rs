//! Time utilities: parsing HH:MM and turning spans into decimal hours.

use crate::errors::{AppError, AppResult};
use crate::utils::formatting::round2;
use chrono::NaiveTime;
use rust_decimal::Decimal;

pub fn parse_time(t: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M")
        .map_err(|_| AppError::validation(format!("invalid time '{t}' (HH:MM)")))
}

pub fn parse_optional_time(input: Option<&str>) -> AppResult<Option<NaiveTime>> {
    input.map(parse_time).transpose()
}

pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Decimal hours between two times, rounded half away from zero to 2 places.
/// Negative when `end` is before `start`.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> Decimal {
    round2(Decimal::from(minutes_between(start, end)) / Decimal::from(60))
}
