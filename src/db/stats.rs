use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> rusqlite::Result<i64> {
    pool.conn.query_row(sql, [], |row| row.get(0))
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) SCHEDULE DATA
    //
    println!(
        "{}• Devices:{} {} entry / {} canteen",
        CYAN,
        RESET,
        count(pool, "SELECT COUNT(*) FROM devices WHERE role = 'entry'")?,
        count(pool, "SELECT COUNT(*) FROM devices WHERE role = 'canteen'")?
    );
    println!(
        "{}• Serving windows:{} {}",
        CYAN,
        RESET,
        count(pool, "SELECT COUNT(*) FROM serving_windows")?
    );
    println!(
        "{}• Shifts:{} {}",
        CYAN,
        RESET,
        count(pool, "SELECT COUNT(*) FROM shifts")?
    );

    //
    // 3) LEDGER
    //
    let total = count(pool, "SELECT COUNT(*) FROM transactions")?;
    let granted = count(
        pool,
        "SELECT COUNT(*) FROM transactions WHERE status = 'granted'",
    )?;
    println!(
        "{}• Transactions:{} {}{}{} ({} granted)",
        CYAN, RESET, GREEN, total, RESET, granted
    );

    let first_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT event_date FROM transactions ORDER BY event_date ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT event_date FROM transactions ORDER BY event_date DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) MONITORED SHARDS
    //
    println!(
        "{}• Monitored shards (persisted):{} {}",
        CYAN,
        RESET,
        count(pool, "SELECT COUNT(*) FROM monitored_table_counts")?
    );

    println!();
    Ok(())
}
