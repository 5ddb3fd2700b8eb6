use crate::attendance::EventSource;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::EligibilityEngine;
use crate::core::poller::Poller;
use crate::core::registry::DeviceRegistry;
use crate::core::snapshot::{MemorySnapshot, SnapshotStore, SqliteSnapshot};
use crate::errors::AppResult;
use crate::ui::messages::info;
use std::thread;
use std::time::Duration;

/// Poll continuously. A tick that cannot reach the attendance store is logged
/// and retried after the interval; the loop only ends after `--ticks` ticks.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { ticks, interval } = cmd {
        let pool = super::open_ledger(cfg)?;
        let source = super::open_source(cfg)?;
        let clock = super::make_clock(cfg, &None)?;
        let registry = DeviceRegistry::new(&pool.conn);
        let engine = EligibilityEngine::new(
            &pool.conn,
            &source,
            clock.as_ref(),
            cfg.evaluation_policy()?,
        );
        let every = interval
            .map(Duration::from_millis)
            .unwrap_or_else(|| cfg.poll_interval());

        info(format!(
            "Watching {} every {} ms (prefix '{}', snapshot: {})",
            cfg.attendance_database,
            every.as_millis(),
            cfg.table_prefix,
            if cfg.persist_snapshot { "persisted" } else { "memory" }
        ));

        if cfg.persist_snapshot {
            let poller = Poller::new(SqliteSnapshot::new(&pool.conn));
            run_loop(poller, &source, &registry, &engine, *ticks, every);
        } else {
            let poller = Poller::new(MemorySnapshot::new());
            run_loop(poller, &source, &registry, &engine, *ticks, every);
        }
    }

    Ok(())
}

fn run_loop<S: SnapshotStore>(
    mut poller: Poller<S>,
    source: &dyn EventSource,
    registry: &DeviceRegistry,
    engine: &EligibilityEngine,
    ticks: Option<u64>,
    every: Duration,
) {
    let mut done: u64 = 0;

    loop {
        match poller.tick(source, registry, engine) {
            Ok(report) => {
                if !report.changed.is_empty() || !report.failures.is_empty() {
                    super::poll::print_report(&report);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "tick failed; retrying after interval");
            }
        }

        done += 1;
        if ticks.is_some_and(|max| done >= max) {
            break;
        }
        thread::sleep(every);
    }

    tracing::info!(ticks = done, "watch finished");
}
