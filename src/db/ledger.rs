//! Append-only transaction ledger.
//!
//! Every verdict the engine reaches is written here, and the ledger is the only
//! source of truth for "has this employee already been granted this window today".

use crate::errors::{AppError, AppResult};
use crate::models::transaction::{NewTransaction, Transaction, TxStatus};
use crate::utils::date::format_date;
use crate::utils::time::{format_datetime, format_time, parse_datetime, parse_time};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, ErrorCode, Row, params};

pub const DUPLICATE_DESCRIPTION: &str = "The employee has already taken a coupon for this window";

fn insert_raw(conn: &Connection, tx: &NewTransaction) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (
            employee_id, event_date, event_time, event_time_of_day,
            matched_entry_time, shift_start_time, status, description,
            window_id, window_name, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    stmt.execute(params![
        tx.employee_id,
        format_date(tx.event_date()),
        format_datetime(tx.event_time),
        format_time(tx.event_time.time()),
        tx.matched_entry_time.map(format_datetime),
        tx.shift_start_time.map(format_time),
        tx.status.to_db_str(),
        tx.description,
        tx.window_id,
        tx.window_name,
        Local::now().to_rfc3339(),
    ])?;

    Ok(conn.last_insert_rowid())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Append one row. Never updates or deletes.
pub fn record(conn: &Connection, tx: &NewTransaction) -> AppResult<i64> {
    insert_raw(conn, tx).map_err(|e| {
        AppError::Ledger(format!(
            "{} for employee {} in window {}: {}",
            tx.status.to_db_str(),
            tx.employee_id,
            tx.window_id,
            e
        ))
    })
}

pub fn has_granted(
    conn: &Connection,
    employee_id: &str,
    date: NaiveDate,
    window_id: i64,
) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions
         WHERE employee_id = ?1 AND event_date = ?2 AND window_id = ?3 AND status = 'granted'
         LIMIT 1",
    )?;
    Ok(stmt.exists(params![employee_id, format_date(date), window_id])?)
}

/// Record a grant unless one already exists for the same (employee, date, window),
/// in which case a `denied_duplicate` row is recorded instead.
///
/// The check and the insert run in one SQLite transaction, and the partial unique
/// index `ux_tx_one_grant` turns any concurrent double grant into a duplicate.
pub fn grant_once(conn: &Connection, tx: &NewTransaction) -> AppResult<(TxStatus, i64)> {
    let granted = tx.with_status(TxStatus::Granted, &tx.description);
    let duplicate = tx.with_status(TxStatus::DeniedDuplicate, DUPLICATE_DESCRIPTION);

    let guard = conn
        .unchecked_transaction()
        .map_err(|e| AppError::Ledger(format!("cannot open ledger transaction: {}", e)))?;

    let outcome = if has_granted(&guard, &tx.employee_id, tx.event_date(), tx.window_id)? {
        (TxStatus::DeniedDuplicate, record(&guard, &duplicate)?)
    } else {
        match insert_raw(&guard, &granted) {
            Ok(id) => (TxStatus::Granted, id),
            Err(e) if is_unique_violation(&e) => {
                (TxStatus::DeniedDuplicate, record(&guard, &duplicate)?)
            }
            Err(e) => return Err(AppError::Ledger(e.to_string())),
        }
    };

    guard
        .commit()
        .map_err(|e| AppError::Ledger(format!("commit failed: {}", e)))?;

    Ok(outcome)
}

fn conversion_error(raw: &str, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(AppError::Other(format!("{} ({})", err, raw))),
    )
}

fn map_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let date_raw: String = row.get("event_date")?;
    let time_raw: String = row.get("event_time")?;
    let tod_raw: String = row.get("event_time_of_day")?;
    let entry_raw: Option<String> = row.get("matched_entry_time")?;
    let shift_raw: Option<String> = row.get("shift_start_time")?;
    let status_raw: String = row.get("status")?;

    let event_date = crate::utils::date::parse_date(&date_raw)
        .ok_or_else(|| conversion_error(&date_raw, AppError::InvalidDate(date_raw.clone())))?;
    let event_time = parse_datetime(&time_raw)
        .ok_or_else(|| conversion_error(&time_raw, AppError::InvalidTime(time_raw.clone())))?;
    let event_time_of_day = parse_time(&tod_raw)
        .ok_or_else(|| conversion_error(&tod_raw, AppError::InvalidTime(tod_raw.clone())))?;
    let status = TxStatus::from_db_str(&status_raw).ok_or_else(|| {
        conversion_error(&status_raw, AppError::InvalidStatus(status_raw.clone()))
    })?;

    Ok(Transaction {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        event_date,
        event_time,
        event_time_of_day,
        matched_entry_time: entry_raw.as_deref().and_then(parse_datetime),
        shift_start_time: shift_raw.as_deref().and_then(parse_time),
        status,
        description: row.get("description")?,
        window_id: row.get("window_id")?,
        window_name: row.get("window_name")?,
        created_at: row.get("created_at")?,
    })
}

/// Ledger rows, oldest first, optionally filtered by date and/or employee.
pub fn list(
    conn: &Connection,
    date: Option<NaiveDate>,
    employee_id: Option<&str>,
) -> AppResult<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM transactions
         WHERE (?1 IS NULL OR event_date = ?1)
           AND (?2 IS NULL OR employee_id = ?2)
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![date.map(format_date), employee_id], map_transaction)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_by_status(conn: &Connection, status: TxStatus) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE status = ?1",
        [status.to_db_str()],
        |row| row.get(0),
    )?)
}
