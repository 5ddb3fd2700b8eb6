pub mod config;
pub mod db;
pub mod device;
pub mod evaluate;
pub mod init;
pub mod link;
pub mod log;
pub mod poll;
pub mod schedule;
pub mod shards;
pub mod transactions;
pub mod watch;

use crate::attendance::{ShardPattern, SqliteEventSource};
use crate::config::Config;
use crate::core::clock::{Clock, FixedClock, SystemClock};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::time::parse_datetime;

/// Open the ledger database and make sure its schema is current.
pub(crate) fn open_ledger(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::with_timeout(&cfg.database, cfg.query_timeout())?;
    init_db(&pool.conn)?;
    Ok(pool)
}

pub(crate) fn open_source(cfg: &Config) -> AppResult<SqliteEventSource> {
    Ok(SqliteEventSource::new(
        &cfg.attendance_database,
        ShardPattern::new(&cfg.table_prefix)?,
        cfg.zone()?,
        cfg.query_timeout(),
    ))
}

/// System clock, or a pinned one when `--now` is given.
pub(crate) fn make_clock(cfg: &Config, now: &Option<String>) -> AppResult<Box<dyn Clock>> {
    match now {
        Some(s) => {
            let at = parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?;
            Ok(Box::new(FixedClock::new(at)))
        }
        None => Ok(Box::new(SystemClock::new(cfg.zone()?))),
    }
}
