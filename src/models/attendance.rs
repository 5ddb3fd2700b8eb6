use chrono::NaiveDateTime;
use serde::Serialize;

/// One swipe read from an attendance shard. Never written by this crate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttendanceEvent {
    pub shard: String,
    pub device_id: String,
    pub employee_id: String,
    pub event_time: NaiveDateTime,
}

/// Row count of one shard, as shown by `shards`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShardCount {
    pub table_name: String,
    pub row_count: i64,
}
