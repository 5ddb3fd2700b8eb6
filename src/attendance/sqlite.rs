use super::{EventSource, ShardPattern};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceEvent;
use crate::models::device::normalize_device_id;
use crate::utils::time::{TimeZoneSetting, parse_datetime};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::Duration;

/// Attendance store backed by a SQLite database whose shard tables carry
/// `srvdt` (server event time), `devuid` (device) and `usrid` (employee) columns.
///
/// The connection is opened read-only and lazily; when the store cannot be reached
/// the connection is dropped and reopened on the next call.
pub struct SqliteEventSource {
    path: String,
    pattern: ShardPattern,
    zone: TimeZoneSetting,
    timeout: Duration,
    conn: RefCell<Option<Connection>>,
}

struct RawRow {
    srvdt: Value,
    devuid: Value,
    usrid: Value,
}

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) if f.fract() == 0.0 => Some((*f as i64).to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(t) => {
            let t = t.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Null | Value::Blob(_) => None,
    }
}

impl SqliteEventSource {
    pub fn new(path: &str, pattern: ShardPattern, zone: TimeZoneSetting, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            pattern,
            zone,
            timeout,
            conn: RefCell::new(None),
        }
    }

    fn open(&self) -> AppResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::AttendanceUnavailable(format!("{}: {}", self.path, e)))?;
        conn.busy_timeout(self.timeout)?;
        Ok(conn)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let mut slot = self.conn.borrow_mut();
        if slot.is_none() {
            *slot = Some(self.open()?);
        }
        match slot.as_ref() {
            Some(conn) => f(conn),
            None => Err(AppError::AttendanceUnavailable(self.path.clone())),
        }
    }

    fn decode(&self, shard: &str, raw: RawRow) -> AppResult<AttendanceEvent> {
        let malformed = |reason: String| AppError::MalformedRow {
            shard: shard.to_string(),
            reason,
        };

        let event_time = self
            .decode_time(&raw.srvdt)
            .ok_or_else(|| malformed(format!("unreadable srvdt {:?}", raw.srvdt)))?;
        let device_id = value_to_string(&raw.devuid)
            .map(|d| normalize_device_id(&d))
            .ok_or_else(|| malformed("missing devuid".into()))?;
        let employee_id =
            value_to_string(&raw.usrid).ok_or_else(|| malformed("missing usrid".into()))?;

        Ok(AttendanceEvent {
            shard: shard.to_string(),
            device_id,
            employee_id,
            event_time,
        })
    }

    /// `srvdt` is either a datetime string or unix seconds.
    fn decode_time(&self, v: &Value) -> Option<NaiveDateTime> {
        match v {
            Value::Integer(secs) => self.zone.from_unix(*secs),
            Value::Real(secs) => self.zone.from_unix(*secs as i64),
            Value::Text(s) => parse_datetime(s),
            Value::Null | Value::Blob(_) => None,
        }
    }

    fn latest_entry_in_shard(
        &self,
        conn: &Connection,
        shard: &str,
        employee_id: &str,
        entry_devices: &BTreeSet<String>,
    ) -> AppResult<Option<AttendanceEvent>> {
        let employee_id = employee_id.trim();
        // Narrows the scan; `value_to_string` below decides the match.
        let sql = format!(
            "SELECT srvdt, devuid, usrid FROM {}
             WHERE TRIM(CAST(usrid AS TEXT)) = ?1
                OR (typeof(usrid) = 'real' AND usrid = CAST(?1 AS REAL))
             ORDER BY srvdt DESC, rowid DESC",
            self.pattern.quoted(shard)?
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([employee_id])?;

        while let Some(row) = rows.next()? {
            let raw = RawRow {
                srvdt: row.get(0)?,
                devuid: row.get(1)?,
                usrid: row.get(2)?,
            };
            if value_to_string(&raw.usrid).as_deref() != Some(employee_id) {
                continue;
            }
            let is_entry = value_to_string(&raw.devuid)
                .map(|d| entry_devices.contains(&normalize_device_id(&d)))
                .unwrap_or(false);
            if is_entry {
                return self.decode(shard, raw).map(Some);
            }
        }

        Ok(None)
    }
}

impl EventSource for SqliteEventSource {
    fn list_shards(&self) -> AppResult<Vec<String>> {
        let result = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut out = Vec::new();
            for r in rows {
                let name = r?;
                if self.pattern.matches(&name) {
                    out.push(name);
                }
            }
            Ok(out)
        });

        if let Err(e) = &result {
            tracing::warn!(path = %self.path, error = %e, "attendance store unreachable");
            // Reconnect on the next call.
            self.conn.borrow_mut().take();
        }

        result
    }

    fn shard_row_count(&self, shard: &str) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.pattern.quoted(shard)?);
        self.with_conn(|conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
    }

    fn latest_event(&self, shard: &str) -> AppResult<Option<AttendanceEvent>> {
        let sql = format!(
            "SELECT srvdt, devuid, usrid FROM {} ORDER BY srvdt DESC, rowid DESC LIMIT 1",
            self.pattern.quoted(shard)?
        );

        let raw = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some(RawRow {
                    srvdt: row.get(0)?,
                    devuid: row.get(1)?,
                    usrid: row.get(2)?,
                })),
                None => Ok(None),
            }
        })?;

        raw.map(|r| self.decode(shard, r)).transpose()
    }

    fn latest_entry_event(
        &self,
        employee_id: &str,
        entry_devices: &BTreeSet<String>,
    ) -> AppResult<Option<AttendanceEvent>> {
        if entry_devices.is_empty() {
            tracing::warn!("no entry devices registered; entry lookup skipped");
            return Ok(None);
        }

        let shards = self.list_shards()?;

        self.with_conn(|conn| {
            let mut latest: Option<AttendanceEvent> = None;

            for shard in &shards {
                match self.latest_entry_in_shard(conn, shard, employee_id, entry_devices) {
                    Ok(Some(ev)) => {
                        if latest
                            .as_ref()
                            .is_none_or(|cur| ev.event_time > cur.event_time)
                        {
                            latest = Some(ev);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(shard = %shard, error = %e, "entry lookup failed; shard skipped");
                    }
                }
            }

            Ok(latest)
        })
    }
}
