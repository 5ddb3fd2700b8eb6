use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::EligibilityEngine;
use crate::core::poller::{Poller, TickReport};
use crate::core::registry::DeviceRegistry;
use crate::core::snapshot::{MemorySnapshot, SqliteSnapshot};
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{GREY, RESET, colorize_verdict};
use crate::utils::time::format_datetime;

/// Run exactly one tick.
///
/// With the default in-memory snapshot every shard counts as changed, so the newest
/// row of each shard is evaluated; the ledger's dedup keeps that harmless.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Poll { now, json } = cmd {
        let pool = super::open_ledger(cfg)?;
        let source = super::open_source(cfg)?;
        let clock = super::make_clock(cfg, now)?;
        let registry = DeviceRegistry::new(&pool.conn);
        let engine = EligibilityEngine::new(
            &pool.conn,
            &source,
            clock.as_ref(),
            cfg.evaluation_policy()?,
        );

        let report = if cfg.persist_snapshot {
            Poller::new(SqliteSnapshot::new(&pool.conn)).tick(&source, &registry, &engine)?
        } else {
            Poller::new(MemorySnapshot::new()).tick(&source, &registry, &engine)?
        };

        if *json {
            let out = serde_json::to_string_pretty(&report)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

/// Human-readable summary of one tick.
pub(crate) fn print_report(report: &TickReport) {
    println!(
        "{}shards: {}  changed: {}  evaluated: {}  ignored: {}  failures: {}{}",
        GREY,
        report.shards.len(),
        report.changed.len(),
        report.evaluations(),
        report.ignored.len(),
        report.failures.len(),
        RESET
    );

    for d in &report.dispatched {
        println!(
            "  {}  employee {:<10} device {:<6} {:<18} {}",
            format_datetime(d.event.event_time),
            d.event.employee_id,
            d.event.device_id,
            colorize_verdict(d.evaluation.verdict.as_str()),
            d.evaluation.window_name.as_deref().unwrap_or("-")
        );
    }

    for f in &report.failures {
        eprintln!("  ⚠️  {}", f);
    }
}
