#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDateTime;
use mealgate::attendance::{ShardPattern, SqliteEventSource};
use mealgate::db::initialize::init_db;
use mealgate::db::queries;
use mealgate::models::device::DeviceRole;
use mealgate::utils::time::{TimeZoneSetting, parse_datetime, parse_time};
use rusqlite::{Connection, params};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub fn mealgate() -> Command {
    cargo_bin_cmd!("mealgate")
}

fn temp_path(name: &str, suffix: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_{}.sqlite", name, suffix));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Unique ledger DB path inside the system temp dir; any previous file is removed
pub fn setup_test_db(name: &str) -> String {
    temp_path(name, "mealgate")
}

/// Unique attendance DB path inside the system temp dir; any previous file is removed
pub fn setup_attendance_db(name: &str) -> String {
    temp_path(name, "attendance")
}

pub fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).expect("valid datetime")
}

/// Create `shard` if missing and append swipes `(srvdt, devuid, usrid)`.
pub fn add_swipes(attendance: &str, shard: &str, rows: &[(&str, i64, &str)]) {
    let conn = Connection::open(attendance).expect("open attendance db");
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {shard} (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            srvdt  TEXT NOT NULL,
            devuid INTEGER NOT NULL,
            usrid  TEXT NOT NULL
        );"
    ))
    .expect("create shard");

    for (srvdt, devuid, usrid) in rows {
        conn.execute(
            &format!("INSERT INTO {shard} (srvdt, devuid, usrid) VALUES (?1, ?2, ?3)"),
            params![srvdt, devuid, usrid],
        )
        .expect("insert swipe");
    }
}

/// Create an arbitrary table in the attendance store (noise for shard enumeration).
pub fn add_raw_table(attendance: &str, ddl: &str) {
    let conn = Connection::open(attendance).expect("open attendance db");
    conn.execute_batch(ddl).expect("create table");
}

pub fn open_source(attendance: &str) -> SqliteEventSource {
    SqliteEventSource::new(
        attendance,
        ShardPattern::new("t_lg").expect("pattern"),
        TimeZoneSetting::parse("UTC").expect("zone"),
        Duration::from_secs(5),
    )
}

/// Ledger with entry device 1, canteen device 2, and one serving window
/// `Lunch 12:00-14:00` linked to shift `Day 08:00-16:00`. Returns (conn, window id).
pub fn seeded_ledger(path: &str) -> (Connection, i64) {
    let conn = Connection::open(path).expect("open ledger");
    init_db(&conn).expect("init db");

    queries::upsert_device(&conn, "1", DeviceRole::Entry).expect("entry device");
    queries::upsert_device(&conn, "2", DeviceRole::Canteen).expect("canteen device");

    let lunch = add_window(&conn, "Lunch", "12:00", "14:00");
    let day = add_shift(&conn, "Day", "08:00", "16:00");
    queries::link_window_shift(&conn, lunch, day).expect("link");

    (conn, lunch)
}

pub fn add_window(conn: &Connection, name: &str, start: &str, end: &str) -> i64 {
    queries::insert_window(
        conn,
        name,
        parse_time(start).expect("start"),
        parse_time(end).expect("end"),
        "",
    )
    .expect("insert window")
    .id
}

pub fn add_shift(conn: &Connection, name: &str, start: &str, end: &str) -> i64 {
    queries::insert_shift(
        conn,
        name,
        parse_time(start).expect("start"),
        parse_time(end).expect("end"),
    )
    .expect("insert shift")
    .id
}

/// Initialize a ledger through the CLI, in test mode
pub fn init_cli(db: &str, attendance: &str) {
    mealgate()
        .args(["--db", db, "--attendance", attendance, "--test", "init"])
        .assert()
        .success();
}
