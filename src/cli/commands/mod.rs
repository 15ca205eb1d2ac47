pub mod alloc;
pub mod bank;
pub mod config;
pub mod db;
pub mod init;
pub mod log;
pub mod profile;
pub mod project;
pub mod punch;
pub mod report;
pub mod task;
pub mod timesheet;
pub mod user;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::open(cfg)?;
    init_db(&pool.conn)?;
    Ok(pool)
}
