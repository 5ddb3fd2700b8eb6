use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Applied migrations are recorded there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Run `sql` inside a transaction and mark `version` as applied.
/// Returns Ok(true) if the migration ran, Ok(false) if it was already applied.
fn apply(conn: &Connection, version: &str, description: &str, sql: &str) -> Result<bool> {
    if is_applied(conn, version)? {
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, description],
    )?;
    tx.commit()?;

    tracing::info!(version, description, "migration applied");
    Ok(true)
}

const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20250301_0001_create_schedule_tables",
        "created devices, serving_windows, shifts, window_shifts",
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            device_id  TEXT PRIMARY KEY,
            role       TEXT NOT NULL CHECK(role IN ('entry','canteen')),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS serving_windows (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            CHECK(start_time < end_time)
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS window_shifts (
            window_id INTEGER NOT NULL REFERENCES serving_windows(id) ON DELETE CASCADE,
            shift_id  INTEGER NOT NULL REFERENCES shifts(id) ON DELETE CASCADE,
            PRIMARY KEY (window_id, shift_id)
        );

        CREATE INDEX IF NOT EXISTS idx_windows_start ON serving_windows(start_time);
        "#,
    ),
    (
        "20250302_0002_create_transactions",
        "created transactions ledger",
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id        TEXT NOT NULL,
            event_date         TEXT NOT NULL,
            event_time         TEXT NOT NULL,
            event_time_of_day  TEXT NOT NULL,
            matched_entry_time TEXT,
            shift_start_time   TEXT,
            status             TEXT NOT NULL CHECK(status IN
                                   ('granted','denied_duplicate','denied_late','denied_no_entry')),
            description        TEXT NOT NULL DEFAULT '',
            window_id          INTEGER NOT NULL,
            window_name        TEXT NOT NULL,
            created_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tx_employee_date ON transactions(employee_id, event_date);
        CREATE INDEX IF NOT EXISTS idx_tx_date ON transactions(event_date);
        "#,
    ),
    (
        "20250307_0003_unique_grant_per_window",
        "one granted transaction per employee, date and window",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_tx_one_grant
            ON transactions(employee_id, event_date, window_id)
            WHERE status = 'granted';
        "#,
    ),
    (
        "20250307_0004_monitored_table_counts",
        "created monitored_table_counts",
        r#"
        CREATE TABLE IF NOT EXISTS monitored_table_counts (
            table_name TEXT PRIMARY KEY,
            row_count  INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Called by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, description, sql) in MIGRATIONS {
        apply(conn, version, description, sql)?;
    }

    Ok(())
}

/// Versions recorded as applied, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
