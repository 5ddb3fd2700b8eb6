use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::EligibilityEngine;
use crate::core::registry::DeviceRegistry;
use crate::db::log;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceEvent;
use crate::models::device::{DeviceClass, normalize_device_id};
use crate::ui::messages::warning;
use crate::utils::colors::colorize_verdict;
use crate::utils::time::{format_datetime, parse_datetime};

/// Evaluate one canteen swipe given on the command line, exactly as the poller would.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Evaluate {
        employee,
        device,
        at,
        now,
    } = cmd
    {
        let pool = super::open_ledger(cfg)?;
        let source = super::open_source(cfg)?;
        let clock = super::make_clock(cfg, now)?;

        let device_id = normalize_device_id(device);
        match DeviceRegistry::new(&pool.conn).classify(&device_id)? {
            DeviceClass::Canteen => {}
            DeviceClass::Entry => {
                warning(format!("Device {} is an entry device; no action.", device_id));
                return Ok(());
            }
            DeviceClass::Unknown => {
                warning(format!("Device {} is not registered; no action.", device_id));
                return Ok(());
            }
        }

        let event_time = match at {
            Some(s) => parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?,
            None => clock.now(),
        };

        let swipe = AttendanceEvent {
            shard: "manual".to_string(),
            device_id,
            employee_id: employee.trim().to_string(),
            event_time,
        };

        let engine = EligibilityEngine::new(
            &pool.conn,
            &source,
            clock.as_ref(),
            cfg.evaluation_policy()?,
        );
        let evaluation = engine.evaluate(&swipe)?;

        let verdict = evaluation.verdict.as_str();
        log::ttlog_quiet(
            &pool.conn,
            "evaluate",
            &swipe.employee_id,
            &format!(
                "{} on device {} at {}: {}",
                swipe.employee_id,
                swipe.device_id,
                format_datetime(swipe.event_time),
                verdict
            ),
        );

        println!(
            "{}  employee {}  window {}",
            colorize_verdict(verdict),
            swipe.employee_id,
            evaluation.window_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
