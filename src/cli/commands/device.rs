use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::{log, queries};
use crate::errors::{AppError, AppResult};
use crate::models::device::{DeviceRole, normalize_device_id};
use crate::ui::messages::{info, success, warning};
use crate::utils::table::Table;

/// Handle the `device` command: register, remove or list scanners.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Device {
        add,
        role,
        remove,
        list,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;
        let conn = &pool.conn;

        if let Some(id) = add {
            let raw_role = role.as_deref().unwrap_or_default();
            let role =
                DeviceRole::from_code(raw_role).ok_or_else(|| AppError::InvalidRole(raw_role.into()))?;

            let device = queries::upsert_device(conn, id, role)?;
            log::ttlog_quiet(
                conn,
                "device_add",
                &device.device_id,
                &format!("Device {} registered as {}", device.device_id, role.to_db_str()),
            );
            success(format!(
                "Device {} registered as {}",
                device.device_id,
                role.to_db_str()
            ));
        }

        if let Some(id) = remove {
            let key = normalize_device_id(id);
            if queries::remove_device(conn, &key)? {
                log::ttlog_quiet(conn, "device_remove", &key, "Device removed");
                success(format!("Device {} removed", key));
            } else {
                warning(format!("Device {} is not registered", key));
            }
        }

        if *list {
            let devices = queries::list_devices(conn)?;
            if devices.is_empty() {
                info("No devices registered.");
                return Ok(());
            }

            let mut table = Table::with_headers(&["DEVICE", "ROLE"]);
            for d in devices {
                table.add_row(vec![d.device_id, d.role.to_db_str().to_string()]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
