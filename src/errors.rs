//! Unified application error type.
//! All modules (db, attendance, core, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Ledger write failed: {0}")]
    Ledger(String),

    // ---------------------------
    // Attendance store
    // ---------------------------
    #[error("Attendance store unavailable: {0}")]
    AttendanceUnavailable(String),

    #[error("Invalid shard name: {0}")]
    InvalidShard(String),

    #[error("Malformed attendance row in {shard}: {reason}")]
    MalformedRow { shard: String, reason: String },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid device role: {0}")]
    InvalidRole(String),

    #[error("Invalid transaction status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Schedule errors
    // ---------------------------
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
