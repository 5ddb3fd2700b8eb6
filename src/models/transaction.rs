use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Granted,
    DeniedDuplicate,
    DeniedLate,
    DeniedNoEntry,
}

impl TxStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TxStatus::Granted => "granted",
            TxStatus::DeniedDuplicate => "denied_duplicate",
            TxStatus::DeniedLate => "denied_late",
            TxStatus::DeniedNoEntry => "denied_no_entry",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "granted" => Some(TxStatus::Granted),
            "denied_duplicate" => Some(TxStatus::DeniedDuplicate),
            "denied_late" => Some(TxStatus::DeniedLate),
            "denied_no_entry" => Some(TxStatus::DeniedNoEntry),
            _ => None,
        }
    }
}

/// A ledger row about to be written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub employee_id: String,
    pub event_time: NaiveDateTime,
    pub matched_entry_time: Option<NaiveDateTime>,
    pub shift_start_time: Option<NaiveTime>,
    pub status: TxStatus,
    pub description: String,
    pub window_id: i64,
    pub window_name: String,
}

impl NewTransaction {
    /// Dedup key date: the calendar day of the canteen swipe.
    pub fn event_date(&self) -> NaiveDate {
        self.event_time.date()
    }

    pub fn with_status(&self, status: TxStatus, description: &str) -> Self {
        Self {
            status,
            description: description.to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub employee_id: String,             // ⇔ transactions.employee_id
    pub event_date: NaiveDate,           // ⇔ transactions.event_date (TEXT "YYYY-MM-DD")
    pub event_time: NaiveDateTime,       // ⇔ transactions.event_time (TEXT "YYYY-MM-DD HH:MM:SS")
    pub event_time_of_day: NaiveTime,    // ⇔ transactions.event_time_of_day (TEXT "HH:MM:SS")
    pub matched_entry_time: Option<NaiveDateTime>,
    pub shift_start_time: Option<NaiveTime>,
    pub status: TxStatus,
    pub description: String,
    pub window_id: i64,
    pub window_name: String,
    pub created_at: String, // ISO8601
}
