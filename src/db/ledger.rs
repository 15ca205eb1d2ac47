//! Append-only ledger tables: clock punches, timesheet entries, banked hours.

use crate::db::db_utils::{
    date_to_db, dec_to_db, get_bool, get_date, get_decimal, get_enum, get_opt_decimal,
    get_opt_time, opt_dec_to_db, sum_decimal_rows, time_to_db,
};
use crate::errors::AppResult;
use crate::models::banked::BankedHoursMovement;
use crate::models::punch::{ClockPunch, PunchType};
use crate::models::timesheet::{CollaboratorClass, EntryMode, ProjectClass, TimesheetEntry};
use chrono::{Local, NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

// ---------------------------
// Clock punches
// ---------------------------

pub fn map_punch(row: &Row) -> rusqlite::Result<ClockPunch> {
    Ok(ClockPunch {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: get_date(row, "date")?,
        kind: get_enum(row, "kind", PunchType::from_db_str)?,
        project_id: row.get("project_id")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_punch(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
    kind: PunchType,
    project_id: Option<i64>,
    note: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO clock_punches (user_id, date, kind, project_id, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            date_to_db(date),
            kind.to_db_str(),
            project_id,
            note,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Punches of one user on one day, in recording order.
pub fn punches_for_day(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<ClockPunch>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM clock_punches
         WHERE user_id = ?1 AND date = ?2
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id, date_to_db(date)], map_punch)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn last_punch_for_day(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
) -> AppResult<Option<ClockPunch>> {
    Ok(conn
        .query_row(
            "SELECT * FROM clock_punches
             WHERE user_id = ?1 AND date = ?2
             ORDER BY id DESC LIMIT 1",
            params![user_id, date_to_db(date)],
            map_punch,
        )
        .optional()?)
}

// ---------------------------
// Timesheet entries
// ---------------------------

pub fn map_entry(row: &Row) -> rusqlite::Result<TimesheetEntry> {
    Ok(TimesheetEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
        task_id: row.get("task_id")?,
        date: get_date(row, "date")?,
        start: get_opt_time(row, "start_time")?,
        end: get_opt_time(row, "end_time")?,
        hours: get_decimal(row, "hours")?,
        mode: get_enum(row, "mode", EntryMode::from_db_str)?,
        collaborator_class: get_enum(row, "collaborator_class", CollaboratorClass::from_db_str)?,
        project_class: get_enum(row, "project_class", ProjectClass::from_db_str)?,
        cost_profile_snapshot_id: row.get("cost_profile_snapshot_id")?,
        cost_per_hour_snapshot: get_opt_decimal(row, "cost_per_hour_snapshot")?,
        price_per_hour_snapshot: get_opt_decimal(row, "price_per_hour_snapshot")?,
        off_hours: get_bool(row, "off_hours")?,
        edit_reason: row.get("edit_reason")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
        created_at: row.get("created_at")?,
    })
}

/// Fully classified entry ready to be appended.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub project_id: i64,
    pub task_id: Option<i64>,
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub hours: Decimal,
    pub mode: EntryMode,
    pub collaborator_class: CollaboratorClass,
    pub project_class: ProjectClass,
    pub cost_profile_snapshot_id: Option<i64>,
    pub cost_per_hour_snapshot: Option<Decimal>,
    pub off_hours: bool,
    pub edit_reason: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
}

pub fn insert_entry(conn: &Connection, e: &NewEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO timesheet_entries (
            user_id, project_id, task_id, date, start_time, end_time, hours, mode,
            collaborator_class, project_class, cost_profile_snapshot_id,
            cost_per_hour_snapshot, price_per_hour_snapshot, off_hours, edit_reason,
            created_by, updated_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, NULL, ?13, ?14, ?15, ?16, ?17)",
        params![
            e.user_id,
            e.project_id,
            e.task_id,
            date_to_db(e.date),
            e.start.map(time_to_db),
            e.end.map(time_to_db),
            dec_to_db(e.hours),
            e.mode.to_db_str(),
            e.collaborator_class.to_db_str(),
            e.project_class.to_db_str(),
            e.cost_profile_snapshot_id,
            opt_dec_to_db(e.cost_per_hour_snapshot),
            e.off_hours as i64,
            e.edit_reason,
            e.created_by,
            e.updated_by,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_entry(conn: &Connection, id: i64) -> AppResult<Option<TimesheetEntry>> {
    Ok(conn
        .query_row(
            "SELECT * FROM timesheet_entries WHERE id = ?1",
            [id],
            map_entry,
        )
        .optional()?)
}

/// Hours of manual (`TIMESHEET`) entries already recorded for a user/day.
pub fn manual_hours_for_day(conn: &Connection, user_id: i64, date: NaiveDate) -> AppResult<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT hours FROM timesheet_entries
         WHERE user_id = ?1 AND date = ?2 AND mode = 'TIMESHEET'",
    )?;
    Ok(sum_decimal_rows(
        &mut stmt,
        params![user_id, date_to_db(date)],
    )?)
}

/// Realized project hours in `[from, to]`; `None` bounds are open.
pub fn project_hours_between(
    conn: &Connection,
    project_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT hours FROM timesheet_entries
         WHERE project_id = ?1
           AND (?2 IS NULL OR date >= ?2)
           AND (?3 IS NULL OR date <= ?3)",
    )?;
    Ok(sum_decimal_rows(
        &mut stmt,
        params![project_id, from.map(date_to_db), to.map(date_to_db)],
    )?)
}

// ---------------------------
// Banked hours
// ---------------------------

fn map_movement(row: &Row) -> rusqlite::Result<BankedHoursMovement> {
    Ok(BankedHoursMovement {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        hours: get_decimal(row, "hours")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_movement(
    conn: &Connection,
    user_id: i64,
    hours: Decimal,
    note: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO banked_hours_movements (user_id, hours, note, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id, dec_to_db(hours), note, Local::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn banked_balance(conn: &Connection, user_id: i64) -> AppResult<Decimal> {
    let mut stmt =
        conn.prepare_cached("SELECT hours FROM banked_hours_movements WHERE user_id = ?1")?;
    Ok(sum_decimal_rows(&mut stmt, [user_id])?)
}

pub fn list_movements(conn: &Connection, user_id: i64) -> AppResult<Vec<BankedHoursMovement>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM banked_hours_movements WHERE user_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([user_id], map_movement)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
