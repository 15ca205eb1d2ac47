use crate::context::RequestContext;
use crate::errors::AppResult;
use chrono::Local;
use rusqlite::Connection;
use rusqlite::params;

/// Write an audit line into the `log` table.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

/// Audit line tagged with the request id and acting user of `ctx`.
pub fn audit(
    conn: &Connection,
    ctx: &RequestContext,
    operation: &str,
    target: &str,
    message: &str,
) -> AppResult<()> {
    let actor = ctx
        .actor_id
        .map(|id| format!("actor={id}"))
        .unwrap_or_else(|| "actor=-".to_string());
    ttlog(
        conn,
        operation,
        target,
        &format!("[{} {}] {}", ctx.tag(), actor, message),
    )
}
