//! Bounded read queries feeding the report engine.
//!
//! Every ledger scan is capped at `max_rows`; the query asks for one extra row
//! so that an overflow is detected without counting first.

use crate::db::db_utils::{date_to_db, get_date, get_decimal, sum_decimal_rows};
use crate::db::ledger::{map_entry, map_punch};
use crate::errors::{AppError, AppResult};
use crate::models::punch::ClockPunch;
use crate::models::report_filter::ReportFilter;
use crate::models::timesheet::TimesheetEntry;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::collections::HashMap;

fn check_limit<T>(rows: Vec<T>, max_rows: usize) -> AppResult<Vec<T>> {
    if rows.len() > max_rows {
        return Err(AppError::ScanLimit(max_rows));
    }
    Ok(rows)
}

fn sql_limit(max_rows: usize) -> i64 {
    i64::try_from(max_rows).unwrap_or(i64::MAX - 1) + 1
}

/// Timesheet entries matching every filter that is set.
pub fn load_entries(
    conn: &Connection,
    filter: &ReportFilter,
    max_rows: usize,
) -> AppResult<Vec<TimesheetEntry>> {
    let mut stmt = conn.prepare(
        "SELECT e.* FROM timesheet_entries e
         JOIN projects p ON p.id = e.project_id
         WHERE (?1 IS NULL OR e.date >= ?1)
           AND (?2 IS NULL OR e.date <= ?2)
           AND (?3 IS NULL OR e.project_id = ?3)
           AND (?4 IS NULL OR e.user_id = ?4)
           AND (?5 IS NULL OR e.cost_profile_snapshot_id = ?5)
           AND (?6 IS NULL OR p.manager_id = ?6)
         ORDER BY e.date ASC, e.id ASC
         LIMIT ?7",
    )?;

    let rows = stmt.query_map(
        params![
            filter.date_from.map(date_to_db),
            filter.date_to.map(date_to_db),
            filter.project_id,
            filter.collaborator_id,
            filter.cost_profile_id,
            filter.manager_id,
            sql_limit(max_rows),
        ],
        map_entry,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    check_limit(out, max_rows)
}

/// Punches in range; only the collaborator and date filters apply to punches.
pub fn load_punches(
    conn: &Connection,
    filter: &ReportFilter,
    max_rows: usize,
) -> AppResult<Vec<ClockPunch>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM clock_punches
         WHERE (?1 IS NULL OR date >= ?1)
           AND (?2 IS NULL OR date <= ?2)
           AND (?3 IS NULL OR user_id = ?3)
         ORDER BY date ASC, user_id ASC, id ASC
         LIMIT ?4",
    )?;

    let rows = stmt.query_map(
        params![
            filter.date_from.map(date_to_db),
            filter.date_to.map(date_to_db),
            filter.collaborator_id,
            sql_limit(max_rows),
        ],
        map_punch,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    check_limit(out, max_rows)
}

/// One dated line of a project's all-time history.
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub date: NaiveDate,
    pub hours: Decimal,
}

/// All-time hours of one project, regardless of any report filter.
pub fn load_project_history(
    conn: &Connection,
    project_id: i64,
    max_rows: usize,
) -> AppResult<Vec<HistoryLine>> {
    let mut stmt = conn.prepare_cached(
        "SELECT date, hours FROM timesheet_entries
         WHERE project_id = ?1
         ORDER BY date ASC, id ASC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![project_id, sql_limit(max_rows)], |row| {
        Ok(HistoryLine {
            date: get_date(row, "date")?,
            hours: get_decimal(row, "hours")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    check_limit(out, max_rows)
}

/// All-time banked balance per user.
pub fn load_banked_balances(conn: &Connection) -> AppResult<HashMap<i64, Decimal>> {
    let mut users = conn.prepare("SELECT DISTINCT user_id FROM banked_hours_movements")?;
    let ids = users
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt =
        conn.prepare_cached("SELECT hours FROM banked_hours_movements WHERE user_id = ?1")?;
    let mut out = HashMap::new();
    for id in ids {
        out.insert(id, sum_decimal_rows(&mut stmt, [id])?);
    }
    Ok(out)
}
