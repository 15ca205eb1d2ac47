use crate::config::Config;
use crate::context::RequestContext;
use crate::db::catalog::{load_project, load_user};
use crate::db::ledger::{insert_punch, last_punch_for_day, punches_for_day};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::punch::{ClockPunch, PunchType};
use crate::utils::date::parse_date;

/// High-level business logic for the `punch` command.
pub struct PunchLogic;

impl PunchLogic {
    /// Append a clock punch for `user_id` on `date` (`YYYY-MM-DD`).
    ///
    /// With `enforce_punch_sequence`, the punch must come strictly after the
    /// last punch of that user and day (`ENTRADA < SAIDA_ALMOCO <
    /// VOLTA_ALMOCO < SAIDA`); skipping steps is allowed.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        pool: &mut DbPool,
        cfg: &Config,
        ctx: &RequestContext,
        user_id: i64,
        date: &str,
        kind: PunchType,
        project_id: Option<i64>,
        note: Option<&str>,
    ) -> AppResult<ClockPunch> {
        let date = parse_date(date)?;

        let tx = pool.write_tx()?;

        let user = load_user(&tx, user_id)?
            .ok_or_else(|| AppError::rule(format!("unknown user {user_id}")))?;
        if !user.lifecycle.is_active() {
            return Err(AppError::rule(format!("user {user_id} is inactive")));
        }

        if let Some(pid) = project_id
            && load_project(&tx, pid)?.is_none()
        {
            return Err(AppError::not_found(format!("project {pid}")));
        }

        if cfg.enforce_punch_sequence
            && let Some(last) = last_punch_for_day(&tx, user_id, date)?
            && kind <= last.kind
        {
            return Err(AppError::rule(format!(
                "{} cannot follow {} on {date}",
                kind.to_db_str(),
                last.kind.to_db_str()
            )));
        }

        let id = insert_punch(&tx, user_id, date, kind, project_id, note)?;
        audit(
            &tx,
            ctx,
            "punch",
            &format!("user:{user_id}"),
            &format!("{} on {date} (#{id})", kind.to_db_str()),
        )?;

        let punch = punches_for_day(&tx, user_id, date)?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("punch {id}")))?;

        tx.commit()?;
        Ok(punch)
    }

    pub fn day(pool: &mut DbPool, user_id: i64, date: &str) -> AppResult<Vec<ClockPunch>> {
        let date = parse_date(date)?;
        punches_for_day(&pool.conn, user_id, date)
    }
}
