use crate::config::Config;
use crate::context::RequestContext;
use crate::db::catalog::load_user;
use crate::db::ledger::{banked_balance, insert_movement, list_movements};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::banked::BankedHoursMovement;
use rust_decimal::Decimal;

/// Signed banked-hours movements and the balance derived from them.
pub struct BankedHoursLogic;

impl BankedHoursLogic {
    /// Append a credit (+) or debit (−). Returns the new balance.
    pub fn record_movement(
        pool: &mut DbPool,
        cfg: &Config,
        ctx: &RequestContext,
        user_id: i64,
        hours: Decimal,
        note: Option<&str>,
    ) -> AppResult<Decimal> {
        if hours.is_zero() {
            return Err(AppError::validation("movement hours must not be zero"));
        }

        let tx = pool.write_tx()?;

        if load_user(&tx, user_id)?.is_none() {
            return Err(AppError::rule(format!("unknown user {user_id}")));
        }

        let balance = banked_balance(&tx, user_id)? + hours;
        if let Some(min) = cfg.banked_hours_min
            && balance < min
        {
            return Err(AppError::rule(format!(
                "banked balance would drop to {balance}, below the minimum {min}"
            )));
        }
        if let Some(max) = cfg.banked_hours_max
            && balance > max
        {
            return Err(AppError::rule(format!(
                "banked balance would reach {balance}, above the maximum {max}"
            )));
        }

        let id = insert_movement(&tx, user_id, hours, note)?;
        audit(
            &tx,
            ctx,
            "bank",
            &format!("user:{user_id}"),
            &format!("movement #{id}: {hours} h, balance {balance} h"),
        )?;

        tx.commit()?;
        Ok(balance)
    }

    /// Sum of every movement of the user; order does not matter.
    pub fn balance(pool: &DbPool, user_id: i64) -> AppResult<Decimal> {
        if load_user(&pool.conn, user_id)?.is_none() {
            return Err(AppError::rule(format!("unknown user {user_id}")));
        }
        banked_balance(&pool.conn, user_id)
    }

    pub fn movements(pool: &DbPool, user_id: i64) -> AppResult<Vec<BankedHoursMovement>> {
        list_movements(&pool.conn, user_id)
    }
}
