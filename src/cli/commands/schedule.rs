//! `window` and `shift` commands: the schedule the engine matches swipes against.

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::{log, queries};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::table::Table;
use crate::utils::time::{format_time, parse_time_strict};

pub fn handle_window(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Window {
        add,
        start,
        end,
        desc,
        remove,
        list,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;
        let conn = &pool.conn;

        if let Some(name) = add {
            let start = parse_time_strict(start.as_deref().unwrap_or_default())?;
            let end = parse_time_strict(end.as_deref().unwrap_or_default())?;

            let window = queries::insert_window(conn, name, start, end, desc)?;
            log::ttlog_quiet(
                conn,
                "window_add",
                &window.id.to_string(),
                &format!("Serving window {} created", window.label()),
            );
            success(format!("Serving window #{} {} created", window.id, window.label()));
        }

        if let Some(id) = remove {
            if queries::delete_window(conn, *id)? {
                log::ttlog_quiet(conn, "window_remove", &id.to_string(), "Serving window removed");
                success(format!("Serving window #{} removed", id));
            } else {
                warning(format!("Serving window #{} not found", id));
            }
        }

        if *list {
            let windows = queries::load_windows(conn)?;
            if windows.is_empty() {
                info("No serving windows defined.");
                return Ok(());
            }

            let mut table = Table::with_headers(&["ID", "NAME", "START", "END", "SHIFTS", "DESCRIPTION"]);
            for w in windows {
                let shifts = queries::shifts_for_window(conn, w.id)?
                    .iter()
                    .map(|s| format!("#{}", s.id))
                    .collect::<Vec<_>>()
                    .join(",");
                table.add_row(vec![
                    w.id.to_string(),
                    w.name,
                    format_time(w.start_time),
                    format_time(w.end_time),
                    if shifts.is_empty() { "-".into() } else { shifts },
                    w.description,
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}

pub fn handle_shift(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Shift {
        add,
        start,
        end,
        remove,
        list,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;
        let conn = &pool.conn;

        if let Some(name) = add {
            let start = parse_time_strict(start.as_deref().unwrap_or_default())?;
            let end = parse_time_strict(end.as_deref().unwrap_or_default())?;

            let shift = queries::insert_shift(conn, name, start, end)?;
            log::ttlog_quiet(
                conn,
                "shift_add",
                &shift.id.to_string(),
                &format!(
                    "Shift {} ({} - {}) created",
                    shift.name,
                    format_time(start),
                    format_time(end)
                ),
            );
            success(format!(
                "Shift #{} {} ({} - {}) created",
                shift.id,
                shift.name,
                format_time(start),
                format_time(end)
            ));
        }

        if let Some(id) = remove {
            if queries::delete_shift(conn, *id)? {
                log::ttlog_quiet(conn, "shift_remove", &id.to_string(), "Shift removed");
                success(format!("Shift #{} removed", id));
            } else {
                warning(format!("Shift #{} not found", id));
            }
        }

        if *list {
            let shifts = queries::load_shifts(conn)?;
            if shifts.is_empty() {
                info("No shifts defined.");
                return Ok(());
            }

            let mut table = Table::with_headers(&["ID", "NAME", "START", "END"]);
            for s in shifts {
                table.add_row(vec![
                    s.id.to_string(),
                    s.name,
                    format_time(s.start_time),
                    format_time(s.end_time),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
