//! Read/write helpers for the schedule tables (devices, serving windows, shifts, links).
//! The engine only reads these; the write helpers back the administrative commands.

use crate::errors::{AppError, AppResult};
use crate::models::device::{Device, DeviceRole, normalize_device_id};
use crate::models::shift::Shift;
use crate::models::window::ServingWindow;
use crate::utils::time::{format_time, parse_time};
use chrono::NaiveTime;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn time_column(row: &Row, col: &str) -> Result<NaiveTime> {
    let raw: String = row.get(col)?;
    parse_time(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTime(raw.clone())),
        )
    })
}

fn map_window(row: &Row) -> Result<ServingWindow> {
    Ok(ServingWindow {
        id: row.get("id")?,
        name: row.get("name")?,
        start_time: time_column(row, "start_time")?,
        end_time: time_column(row, "end_time")?,
        description: row.get("description")?,
    })
}

fn map_shift(row: &Row) -> Result<Shift> {
    Ok(Shift {
        id: row.get("id")?,
        name: row.get("name")?,
        start_time: time_column(row, "start_time")?,
        end_time: time_column(row, "end_time")?,
    })
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

pub fn device_role(conn: &Connection, device_id: &str) -> AppResult<Option<DeviceRole>> {
    let key = normalize_device_id(device_id);
    let raw: Option<String> = conn
        .prepare_cached("SELECT role FROM devices WHERE device_id = ?1")?
        .query_row([key], |row| row.get(0))
        .optional()?;

    match raw {
        Some(r) => DeviceRole::from_db_str(&r)
            .map(Some)
            .ok_or(AppError::InvalidRole(r)),
        None => Ok(None),
    }
}

pub fn device_ids_with_role(conn: &Connection, role: DeviceRole) -> AppResult<Vec<String>> {
    let mut stmt =
        conn.prepare_cached("SELECT device_id FROM devices WHERE role = ?1 ORDER BY device_id")?;
    let rows = stmt.query_map([role.to_db_str()], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert or re-assign a device. A device has exactly one role at a time.
pub fn upsert_device(conn: &Connection, device_id: &str, role: DeviceRole) -> AppResult<Device> {
    let key = normalize_device_id(device_id);
    if key.is_empty() {
        return Err(AppError::NotFound("empty device id".into()));
    }

    conn.execute(
        "INSERT INTO devices (device_id, role) VALUES (?1, ?2)
         ON CONFLICT(device_id) DO UPDATE SET role = excluded.role",
        params![key, role.to_db_str()],
    )?;

    Ok(Device {
        device_id: key,
        role,
    })
}

pub fn remove_device(conn: &Connection, device_id: &str) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM devices WHERE device_id = ?1",
        [normalize_device_id(device_id)],
    )?;
    Ok(n > 0)
}

pub fn list_devices(conn: &Connection) -> AppResult<Vec<Device>> {
    let mut stmt = conn.prepare("SELECT device_id, role FROM devices ORDER BY role, device_id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (device_id, role) = r?;
        let role = DeviceRole::from_db_str(&role).ok_or(AppError::InvalidRole(role))?;
        out.push(Device { device_id, role });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Serving windows
// ---------------------------------------------------------------------------

pub fn insert_window(
    conn: &Connection,
    name: &str,
    start: NaiveTime,
    end: NaiveTime,
    description: &str,
) -> AppResult<ServingWindow> {
    if start >= end {
        return Err(AppError::InvalidRange(format!(
            "window '{}' must start before it ends ({} >= {})",
            name,
            format_time(start),
            format_time(end)
        )));
    }

    conn.execute(
        "INSERT INTO serving_windows (name, start_time, end_time, description)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, format_time(start), format_time(end), description],
    )?;

    Ok(ServingWindow {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        start_time: start,
        end_time: end,
        description: description.to_string(),
    })
}

pub fn load_windows(conn: &Connection) -> AppResult<Vec<ServingWindow>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, start_time, end_time, description
         FROM serving_windows
         ORDER BY start_time ASC, id ASC",
    )?;
    let rows = stmt.query_map([], map_window)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_window(conn: &Connection, id: i64) -> AppResult<Option<ServingWindow>> {
    Ok(conn
        .prepare_cached(
            "SELECT id, name, start_time, end_time, description
             FROM serving_windows WHERE id = ?1",
        )?
        .query_row([id], map_window)
        .optional()?)
}

pub fn delete_window(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM serving_windows WHERE id = ?1", [id])? > 0)
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

pub fn insert_shift(
    conn: &Connection,
    name: &str,
    start: NaiveTime,
    end: NaiveTime,
) -> AppResult<Shift> {
    // Night shifts legitimately end after midnight, so no start < end check here.
    conn.execute(
        "INSERT INTO shifts (name, start_time, end_time) VALUES (?1, ?2, ?3)",
        params![name, format_time(start), format_time(end)],
    )?;

    Ok(Shift {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        start_time: start,
        end_time: end,
    })
}

pub fn load_shifts(conn: &Connection) -> AppResult<Vec<Shift>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, start_time, end_time FROM shifts ORDER BY start_time ASC, id ASC",
    )?;
    let rows = stmt.query_map([], map_shift)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_shift(conn: &Connection, id: i64) -> AppResult<Option<Shift>> {
    Ok(conn
        .prepare_cached("SELECT id, name, start_time, end_time FROM shifts WHERE id = ?1")?
        .query_row([id], map_shift)
        .optional()?)
}

pub fn delete_shift(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM shifts WHERE id = ?1", [id])? > 0)
}

// ---------------------------------------------------------------------------
// Window ↔ shift links
// ---------------------------------------------------------------------------

pub fn link_window_shift(conn: &Connection, window_id: i64, shift_id: i64) -> AppResult<()> {
    if get_window(conn, window_id)?.is_none() {
        return Err(AppError::NotFound(format!("serving window {}", window_id)));
    }
    if get_shift(conn, shift_id)?.is_none() {
        return Err(AppError::NotFound(format!("shift {}", shift_id)));
    }

    conn.execute(
        "INSERT OR IGNORE INTO window_shifts (window_id, shift_id) VALUES (?1, ?2)",
        params![window_id, shift_id],
    )?;
    Ok(())
}

pub fn unlink_window_shift(conn: &Connection, window_id: i64, shift_id: i64) -> AppResult<bool> {
    Ok(conn.execute(
        "DELETE FROM window_shifts WHERE window_id = ?1 AND shift_id = ?2",
        params![window_id, shift_id],
    )? > 0)
}

pub fn shifts_for_window(conn: &Connection, window_id: i64) -> AppResult<Vec<Shift>> {
    let mut stmt = conn.prepare_cached(
        "SELECT s.id, s.name, s.start_time, s.end_time
         FROM shifts AS s
         JOIN window_shifts AS ws ON ws.shift_id = s.id
         WHERE ws.window_id = ?1
         ORDER BY s.start_time ASC, s.id ASC",
    )?;
    let rows = stmt.query_map([window_id], map_shift)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
