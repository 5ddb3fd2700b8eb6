//! Access to the external, sharded attendance log.
//!
//! Swipes are spread across many append-only tables named `<prefix>NNNNNN`.
//! New shards appear over time, so they are enumerated on every call.

pub mod shard;
pub mod sqlite;

use crate::errors::AppResult;
use crate::models::attendance::AttendanceEvent;
use std::collections::BTreeSet;

pub use shard::ShardPattern;
pub use sqlite::SqliteEventSource;

pub trait EventSource {
    /// Shard names matching `^{prefix}\d{6}$`, sorted. An error means the store is unreachable.
    fn list_shards(&self) -> AppResult<Vec<String>>;

    fn shard_row_count(&self, shard: &str) -> AppResult<i64>;

    /// Most recent row of `shard` by event time.
    fn latest_event(&self, shard: &str) -> AppResult<Option<AttendanceEvent>>;

    /// Most recent swipe of `employee_id` on any of `entry_devices`, across all shards.
    /// Shards that fail are logged and skipped.
    fn latest_entry_event(
        &self,
        employee_id: &str,
        entry_devices: &BTreeSet<String>,
    ) -> AppResult<Option<AttendanceEvent>>;
}
