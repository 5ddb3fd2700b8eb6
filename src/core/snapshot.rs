//! The poller's memory of shard row counts between ticks.

use crate::errors::AppResult;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;

pub type ShardCounts = BTreeMap<String, i64>;

pub trait SnapshotStore {
    fn load(&mut self) -> AppResult<ShardCounts>;
    fn save(&mut self, counts: &ShardCounts) -> AppResult<()>;
}

/// Process-memory snapshot. Empty at startup, so the first tick treats every shard as changed.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    counts: ShardCounts,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, as a process restart would.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

impl SnapshotStore for MemorySnapshot {
    fn load(&mut self) -> AppResult<ShardCounts> {
        Ok(self.counts.clone())
    }

    fn save(&mut self, counts: &ShardCounts) -> AppResult<()> {
        self.counts = counts.clone();
        Ok(())
    }
}

/// Snapshot kept in `monitored_table_counts`, surviving restarts.
pub struct SqliteSnapshot<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSnapshot<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotStore for SqliteSnapshot<'_> {
    fn load(&mut self) -> AppResult<ShardCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT table_name, row_count FROM monitored_table_counts")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut out = ShardCounts::new();
        for r in rows {
            let (name, count) = r?;
            out.insert(name, count);
        }
        Ok(out)
    }

    fn save(&mut self, counts: &ShardCounts) -> AppResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM monitored_table_counts", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO monitored_table_counts (table_name, row_count, updated_at)
                 VALUES (?1, ?2, datetime('now'))",
            )?;
            for (name, count) in counts {
                stmt.execute(params![name, count])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
