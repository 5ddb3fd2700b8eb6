//! Change detection over the sharded attendance log.
//!
//! There is no push mechanism on the access-control side, so every tick compares
//! each shard's row count with the previous snapshot and looks at the newest row
//! of every shard that changed. Idempotence does not depend on this module: a
//! reset snapshot re-evaluates old rows and the ledger's dedup check absorbs them.

use crate::attendance::EventSource;
use crate::core::engine::{EligibilityEngine, Evaluation};
use crate::core::registry::DeviceRegistry;
use crate::core::snapshot::{ShardCounts, SnapshotStore};
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceEvent, ShardCount};
use crate::models::device::DeviceClass;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    Idle,
    Scanning,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShardChange {
    pub shard: String,
    pub previous: Option<i64>,
    pub current: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    pub event: AttendanceEvent,
    pub evaluation: Evaluation,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TickReport {
    pub shards: Vec<ShardCount>,
    pub changed: Vec<ShardChange>,
    pub dispatched: Vec<Dispatched>,
    /// Latest rows from entry or unregistered devices.
    pub ignored: Vec<AttendanceEvent>,
    pub failures: Vec<String>,
}

impl TickReport {
    pub fn evaluations(&self) -> usize {
        self.dispatched.len()
    }
}

pub struct Poller<S: SnapshotStore> {
    snapshot: S,
    state: PollerState,
}

impl<S: SnapshotStore> Poller<S> {
    pub fn new(snapshot: S) -> Self {
        Self {
            snapshot,
            state: PollerState::Idle,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn snapshot_mut(&mut self) -> &mut S {
        &mut self.snapshot
    }

    /// One Idle → Scanning → Idle cycle.
    ///
    /// Returns Err only when the shard list cannot be read at all (store unreachable);
    /// every other failure is logged, listed in the report, and retried next tick.
    pub fn tick(
        &mut self,
        source: &dyn EventSource,
        registry: &DeviceRegistry,
        engine: &EligibilityEngine,
    ) -> AppResult<TickReport> {
        self.state = PollerState::Scanning;
        let result = self.scan(source, registry, engine);
        self.state = PollerState::Idle;
        result
    }

    fn scan(
        &mut self,
        source: &dyn EventSource,
        registry: &DeviceRegistry,
        engine: &EligibilityEngine,
    ) -> AppResult<TickReport> {
        let shards = source.list_shards()?;
        let previous = self.snapshot.load()?;
        let mut next = ShardCounts::new();
        let mut report = TickReport::default();

        for shard in shards {
            let count = match source.shard_row_count(&shard) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(shard = %shard, error = %e, "row count failed; shard skipped");
                    report.failures.push(format!("{}: {}", shard, e));
                    if let Some(old) = previous.get(&shard) {
                        next.insert(shard, *old);
                    }
                    continue;
                }
            };

            report.shards.push(ShardCount {
                table_name: shard.clone(),
                row_count: count,
            });

            let before = previous.get(&shard).copied();
            // A decrease counts as a change too, so the snapshot never silently desyncs.
            if before == Some(count) {
                next.insert(shard, count);
                continue;
            }

            tracing::info!(shard = %shard, ?before, count, "row count changed");
            report.changed.push(ShardChange {
                shard: shard.clone(),
                previous: before,
                current: count,
            });

            match self.process_shard(&shard, source, registry, engine, &mut report) {
                Ok(()) => {
                    next.insert(shard, count);
                }
                Err(e) => {
                    tracing::warn!(shard = %shard, error = %e, "latest event unavailable; retrying next tick");
                    report.failures.push(format!("{}: {}", shard, e));
                    if let Some(old) = before {
                        next.insert(shard, old);
                    }
                }
            }
        }

        if let Err(e) = self.snapshot.save(&next) {
            tracing::error!(error = %e, "failed to persist shard snapshot");
            report.failures.push(format!("snapshot: {}", e));
        }

        Ok(report)
    }

    /// Read the newest row of a changed shard and dispatch it if it came from a canteen device.
    /// Errors returned here mean the row could not be read; evaluation errors are only logged.
    fn process_shard(
        &self,
        shard: &str,
        source: &dyn EventSource,
        registry: &DeviceRegistry,
        engine: &EligibilityEngine,
        report: &mut TickReport,
    ) -> AppResult<()> {
        let Some(event) = source.latest_event(shard)? else {
            tracing::debug!(shard, "shard is empty");
            return Ok(());
        };

        match registry.classify(&event.device_id)? {
            DeviceClass::Canteen => match engine.evaluate(&event) {
                Ok(evaluation) => report.dispatched.push(Dispatched { event, evaluation }),
                Err(e) => {
                    tracing::error!(
                        employee = %event.employee_id,
                        device = %event.device_id,
                        error = %e,
                        "evaluation failed; no coupon recorded"
                    );
                    report.failures.push(format!(
                        "evaluation of {} on {}: {}",
                        event.employee_id, event.device_id, e
                    ));
                }
            },
            DeviceClass::Entry | DeviceClass::Unknown => {
                tracing::debug!(device = %event.device_id, "not a canteen device; no action");
                report.ignored.push(event);
            }
        }

        Ok(())
    }
}
