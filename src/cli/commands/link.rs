use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::{log, queries};
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Link {
        window,
        shift,
        remove,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;
        let conn = &pool.conn;
        let target = format!("{}:{}", window, shift);

        if *remove {
            if queries::unlink_window_shift(conn, *window, *shift)? {
                log::ttlog_quiet(conn, "unlink", &target, "Shift unlinked from serving window");
                success(format!("Shift #{} unlinked from window #{}", shift, window));
            } else {
                warning(format!("Shift #{} is not linked to window #{}", shift, window));
            }
        } else {
            queries::link_window_shift(conn, *window, *shift)?;
            log::ttlog_quiet(conn, "link", &target, "Shift linked to serving window");
            success(format!("Shift #{} linked to window #{}", shift, window));
        }
    }

    Ok(())
}
