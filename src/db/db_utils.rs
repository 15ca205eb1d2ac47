//! Column conversion helpers: decimals, dates and enums are stored as TEXT.

use crate::errors::AppError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rusqlite::Row;
use rusqlite::types::Type;
use std::str::FromStr;

pub fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
}

pub fn get_decimal(row: &Row, col: &str) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(col)?;
    Decimal::from_str(&raw)
        .map_err(|_| conversion_error(AppError::validation(format!("bad decimal in {col}: {raw}"))))
}

pub fn get_opt_decimal(row: &Row, col: &str) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => Decimal::from_str(&s).map(Some).map_err(|_| {
            conversion_error(AppError::validation(format!("bad decimal in {col}: {s}")))
        }),
    }
}

pub fn get_date(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion_error(AppError::validation(format!("bad date in {col}: {raw}"))))
}

pub fn get_opt_time(row: &Row, col: &str) -> rusqlite::Result<Option<NaiveTime>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M").map(Some).map_err(|_| {
            conversion_error(AppError::validation(format!("bad time in {col}: {s}")))
        }),
    }
}

/// Decode a TEXT enum column through the enum's `from_db_str`.
pub fn get_enum<T>(row: &Row, col: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    parse(&raw).ok_or_else(|| {
        conversion_error(AppError::validation(format!("bad value in {col}: {raw}")))
    })
}

pub fn get_bool(row: &Row, col: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}

pub fn dec_to_db(d: Decimal) -> String {
    d.normalize().to_string()
}

pub fn opt_dec_to_db(d: Option<Decimal>) -> Option<String> {
    d.map(dec_to_db)
}

pub fn date_to_db(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn time_to_db(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Sum a TEXT decimal column client-side; SQLite's SUM() would go through REAL.
pub fn sum_decimal_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Decimal> {
    let rows = stmt.query_map(params, |row| get_decimal(row, "hours"))?;
    let mut total = Decimal::ZERO;
    for r in rows {
        total += r?;
    }
    Ok(total)
}
