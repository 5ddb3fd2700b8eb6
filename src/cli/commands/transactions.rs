use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::ledger;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use crate::utils::colors::colorize_verdict;
use crate::utils::date::{format_date, parse_date};
use crate::utils::table::Table;
use crate::utils::time::{format_datetime, format_time};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Transactions {
        date,
        employee,
        today: only_today,
        json,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;

        let date = match date {
            Some(d) => Some(parse_date(d).ok_or_else(|| AppError::InvalidDate(d.clone()))?),
            None if *only_today => Some(cfg.zone()?.now().date()),
            None => None,
        };

        let rows = ledger::list(&pool.conn, date, employee.as_deref())?;

        if *json {
            let out =
                serde_json::to_string_pretty(&rows).map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        if rows.is_empty() {
            info("No transactions recorded.");
            return Ok(());
        }

        // Status is appended after rendering so ANSI codes do not skew the column widths
        let mut table = Table::with_headers(&[
            "ID", "DATE", "EMPLOYEE", "SWIPE", "ENTRY", "SHIFT", "WINDOW",
        ]);
        let mut statuses = Vec::with_capacity(rows.len());
        for tx in &rows {
            table.add_row(vec![
                tx.id.to_string(),
                format_date(tx.event_date),
                tx.employee_id.clone(),
                format_time(tx.event_time_of_day),
                tx.matched_entry_time
                    .map(format_datetime)
                    .unwrap_or_else(|| "-".into()),
                tx.shift_start_time
                    .map(format_time)
                    .unwrap_or_else(|| "-".into()),
                tx.window_name.clone(),
            ]);
            statuses.push(colorize_verdict(tx.status.to_db_str()));
        }

        let rendered = table.render();
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            println!("{}STATUS", header);
        }
        if let Some(rule) = lines.next() {
            println!("{}{}", rule, "-".repeat(16));
        }
        for (line, status) in lines.zip(statuses) {
            println!("{}{}", line, status);
        }
    }

    Ok(())
}
