//! Coupon eligibility decision for a single canteen swipe.
//!
//! The active serving windows form an ordered candidate list (earliest start first).
//! Each candidate is assessed against the employee's latest entry swipe, and the
//! first candidate that matches a linked shift is committed to. Denials on earlier
//! candidates never block a match on a later one, and the last candidate always
//! produces a ledger row, so every evaluation with at least one active window ends
//! in exactly one terminal verdict.

use crate::attendance::EventSource;
use crate::core::catalog::ScheduleCatalog;
use crate::core::clock::Clock;
use crate::core::registry::DeviceRegistry;
use crate::db::ledger;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceEvent;
use crate::models::shift::Shift;
use crate::models::transaction::{NewTransaction, TxStatus};
use crate::models::window::ServingWindow;
use crate::utils::time::{WindowClock, within_tolerance};
use chrono::{Duration, NaiveTime};
use rusqlite::Connection;
use serde::Serialize;

pub const GRANTED_DESCRIPTION: &str = "New coupon added";
pub const NO_ENTRY_DESCRIPTION: &str = "No entry swipe found for the employee";
pub const OUT_OF_RANGE_DESCRIPTION: &str = "Shift start time is not within the entry range";
pub const NO_SHIFT_DESCRIPTION: &str = "No shift is linked to this serving window";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationPolicy {
    pub window_clock: WindowClock,
    /// Half-width of the band around the entry time in which the shift must start.
    pub entry_tolerance: Duration,
    /// Entry swipes this far (or further) from the canteen swipe are too old.
    pub stale_after: Duration,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            window_clock: WindowClock::Now,
            entry_tolerance: Duration::hours(1),
            stale_after: Duration::hours(24),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Granted,
    DeniedDuplicate,
    DeniedLate,
    DeniedNoEntry,
    /// No serving window was active; nothing recorded.
    NoOp,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Granted => "granted",
            Verdict::DeniedDuplicate => "denied_duplicate",
            Verdict::DeniedLate => "denied_late",
            Verdict::DeniedNoEntry => "denied_no_entry",
            Verdict::NoOp => "no_op",
        }
    }
}

impl From<TxStatus> for Verdict {
    fn from(s: TxStatus) -> Self {
        match s {
            TxStatus::Granted => Verdict::Granted,
            TxStatus::DeniedDuplicate => Verdict::DeniedDuplicate,
            TxStatus::DeniedLate => Verdict::DeniedLate,
            TxStatus::DeniedNoEntry => Verdict::DeniedNoEntry,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Window the terminal verdict was recorded against.
    pub window_id: Option<i64>,
    pub window_name: Option<String>,
    /// Ledger ids written during this evaluation, in order.
    pub recorded: Vec<i64>,
}

impl Evaluation {
    fn no_op() -> Self {
        Self {
            verdict: Verdict::NoOp,
            window_id: None,
            window_name: None,
            recorded: Vec::new(),
        }
    }
}

/// How one candidate window relates to the employee's entry swipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    NoEntry,
    Stale,
    /// Entry is recent but no linked shift starts within the tolerance band.
    OutOfRange { shift_start: Option<NaiveTime> },
    Match { shift: Shift },
}

/// Pure decision for one candidate, independent of the ledger.
pub fn assess(
    shifts: &[Shift],
    entry: Option<&AttendanceEvent>,
    swipe: &AttendanceEvent,
    policy: &EvaluationPolicy,
) -> Assessment {
    let Some(entry) = entry else {
        return Assessment::NoEntry;
    };

    let gap = (swipe.event_time - entry.event_time).abs();
    if gap >= policy.stale_after {
        return Assessment::Stale;
    }

    let entry_tod = entry.event_time.time();
    match shifts
        .iter()
        .find(|s| within_tolerance(entry_tod, s.start_time, policy.entry_tolerance))
    {
        Some(shift) => Assessment::Match {
            shift: shift.clone(),
        },
        None => Assessment::OutOfRange {
            shift_start: shifts.first().map(|s| s.start_time),
        },
    }
}

pub struct EligibilityEngine<'a> {
    conn: &'a Connection,
    source: &'a dyn EventSource,
    clock: &'a dyn Clock,
    policy: EvaluationPolicy,
}

impl<'a> EligibilityEngine<'a> {
    pub fn new(
        conn: &'a Connection,
        source: &'a dyn EventSource,
        clock: &'a dyn Clock,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            conn,
            source,
            clock,
            policy,
        }
    }

    /// Evaluate a swipe already known to come from a canteen device.
    pub fn evaluate(&self, swipe: &AttendanceEvent) -> AppResult<Evaluation> {
        let at = match self.policy.window_clock {
            WindowClock::Now => self.clock.now(),
            WindowClock::EventTime => swipe.event_time,
        };

        let catalog = ScheduleCatalog::new(self.conn);
        let candidates = catalog.active_windows(at.time())?;

        if candidates.is_empty() {
            tracing::info!(
                employee = %swipe.employee_id,
                at = %at,
                "no active serving window; swipe ignored"
            );
            return Ok(Evaluation::no_op());
        }

        let entry_devices = DeviceRegistry::new(self.conn).entry_devices()?;
        let entry = self
            .source
            .latest_entry_event(&swipe.employee_id, &entry_devices)?;

        let mut recorded = Vec::new();
        let total = candidates.len();

        for (idx, window) in candidates.iter().enumerate() {
            let last = idx + 1 == total;
            let shifts = catalog.shifts_for_window(window.id)?;
            let assessment = assess(&shifts, entry.as_ref(), swipe, &self.policy);

            tracing::debug!(
                window = %window.label(),
                candidate = idx + 1,
                of = total,
                ?assessment,
                "candidate assessed"
            );

            let base = NewTransaction {
                employee_id: swipe.employee_id.clone(),
                event_time: swipe.event_time,
                matched_entry_time: entry.as_ref().map(|e| e.event_time),
                shift_start_time: None,
                status: TxStatus::DeniedLate,
                description: String::new(),
                window_id: window.id,
                window_name: window.name.clone(),
            };

            match assessment {
                Assessment::NoEntry => {
                    let id = ledger::record(
                        self.conn,
                        &base.with_status(TxStatus::DeniedNoEntry, NO_ENTRY_DESCRIPTION),
                    )?;
                    recorded.push(id);
                    if last {
                        return Ok(self.finish(swipe, window, TxStatus::DeniedNoEntry, recorded));
                    }
                }
                Assessment::Stale => {
                    let description = format!(
                        "The employee entered more than {} hours ago",
                        self.policy.stale_after.num_hours()
                    );
                    let id =
                        ledger::record(self.conn, &base.with_status(TxStatus::DeniedLate, &description))?;
                    recorded.push(id);
                    if last {
                        return Ok(self.finish(swipe, window, TxStatus::DeniedLate, recorded));
                    }
                }
                Assessment::OutOfRange { shift_start } => {
                    if last {
                        let description = if shifts.is_empty() {
                            NO_SHIFT_DESCRIPTION
                        } else {
                            OUT_OF_RANGE_DESCRIPTION
                        };
                        let tx = NewTransaction {
                            shift_start_time: shift_start,
                            ..base.with_status(TxStatus::DeniedLate, description)
                        };
                        recorded.push(ledger::record(self.conn, &tx)?);
                        return Ok(self.finish(swipe, window, TxStatus::DeniedLate, recorded));
                    }
                }
                Assessment::Match { shift } => {
                    let tx = NewTransaction {
                        shift_start_time: Some(shift.start_time),
                        ..base.with_status(TxStatus::Granted, GRANTED_DESCRIPTION)
                    };
                    let (status, id) = ledger::grant_once(self.conn, &tx)?;
                    recorded.push(id);
                    return Ok(self.finish(swipe, window, status, recorded));
                }
            }
        }

        // The last candidate always returns above.
        Ok(Evaluation::no_op())
    }

    fn finish(
        &self,
        swipe: &AttendanceEvent,
        window: &ServingWindow,
        status: TxStatus,
        recorded: Vec<i64>,
    ) -> Evaluation {
        let verdict = Verdict::from(status);
        tracing::info!(
            employee = %swipe.employee_id,
            device = %swipe.device_id,
            window = %window.label(),
            verdict = verdict.as_str(),
            "canteen swipe evaluated"
        );

        Evaluation {
            verdict,
            window_id: Some(window.id),
            window_name: Some(window.name.clone()),
            recorded,
        }
    }
}
