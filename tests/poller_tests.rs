use mealgate::core::clock::FixedClock;
use mealgate::core::engine::{EligibilityEngine, EvaluationPolicy, Verdict};
use mealgate::core::poller::{Poller, PollerState};
use mealgate::core::registry::DeviceRegistry;
use mealgate::core::snapshot::{MemorySnapshot, ShardCounts, SnapshotStore, SqliteSnapshot};
use mealgate::db::ledger;
use mealgate::models::transaction::TxStatus;

mod common;
use common::{
    add_raw_table, add_swipes, dt, open_source, seeded_ledger, setup_attendance_db, setup_test_db,
};

#[test]
fn test_unchanged_shards_are_not_reprocessed() {
    let db = setup_test_db("poller_idempotent");
    let att = setup_attendance_db("poller_idempotent");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 2, "E1")],
    );

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:05"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    let first = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(first.changed.len(), 1);
    assert_eq!(first.evaluations(), 1);
    assert_eq!(first.dispatched[0].evaluation.verdict, Verdict::Granted);
    assert_eq!(poller.state(), PollerState::Idle);

    let second = poller.tick(&source, &registry, &engine).expect("tick");
    assert!(second.changed.is_empty());
    assert_eq!(second.evaluations(), 0);
    assert_eq!(ledger::list(&conn, None, None).expect("list").len(), 1);
}

#[test]
fn test_new_row_triggers_evaluation() {
    let db = setup_test_db("poller_new_row");
    let att = setup_attendance_db("poller_new_row");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 08:10:00", 1, "E2")],
    );

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:05"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    // Latest row comes from an entry device: nothing to evaluate
    let first = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(first.evaluations(), 0);
    assert_eq!(first.ignored.len(), 1);

    add_swipes(&att, "t_lg202503", &[("2025-03-07 12:30:00", 2, "E2")]);

    let second = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(second.changed.len(), 1);
    assert_eq!(second.changed[0].previous, Some(2));
    assert_eq!(second.changed[0].current, 3);
    assert_eq!(second.dispatched[0].event.employee_id, "E2");
    assert_eq!(second.dispatched[0].evaluation.verdict, Verdict::Granted);
}

#[test]
fn test_reset_snapshot_does_not_double_grant() {
    let db = setup_test_db("poller_reset");
    let att = setup_attendance_db("poller_reset");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 2, "E1")],
    );

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:31:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    poller.tick(&source, &registry, &engine).expect("tick");
    poller.snapshot_mut().reset();

    let replay = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(replay.evaluations(), 1);
    assert_eq!(
        replay.dispatched[0].evaluation.verdict,
        Verdict::DeniedDuplicate
    );
    assert_eq!(
        ledger::count_by_status(&conn, TxStatus::Granted).expect("count"),
        1
    );
}

#[test]
fn test_count_decrease_is_a_change() {
    let db = setup_test_db("poller_decrease");
    let att = setup_attendance_db("poller_decrease");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(&att, "t_lg202503", &[("2025-03-07 08:05:00", 1, "E1")]);

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());

    let mut snapshot = MemorySnapshot::new();
    let mut previous = ShardCounts::new();
    previous.insert("t_lg202503".to_string(), 10);
    snapshot.save(&previous).expect("save");
    let mut poller = Poller::new(snapshot);

    let report = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(report.changed.len(), 1);
    assert_eq!(report.changed[0].previous, Some(10));
    assert_eq!(report.changed[0].current, 1);
    assert_eq!(
        poller.snapshot_mut().load().expect("load").get("t_lg202503"),
        Some(&1)
    );
}

#[test]
fn test_only_shard_tables_are_monitored() {
    let db = setup_test_db("poller_shards");
    let att = setup_attendance_db("poller_shards");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(&att, "t_lg202503", &[("2025-03-07 08:05:00", 1, "E1")]);
    add_raw_table(&att, "CREATE TABLE t_lg2025 (x INTEGER);");
    add_raw_table(&att, "CREATE TABLE t_lg2025031 (x INTEGER);");
    add_raw_table(&att, "CREATE TABLE users (x INTEGER);");

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    let report = poller.tick(&source, &registry, &engine).expect("tick");
    let names: Vec<&str> = report
        .shards
        .iter()
        .map(|s| s.table_name.as_str())
        .collect();
    assert_eq!(names, vec!["t_lg202503"]);
    assert!(report.failures.is_empty());
}

#[test]
fn test_unknown_device_is_ignored() {
    let db = setup_test_db("poller_unknown");
    let att = setup_attendance_db("poller_unknown");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 99, "E1")],
    );

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    let report = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(report.evaluations(), 0);
    assert_eq!(report.ignored.len(), 1);
    assert_eq!(report.ignored[0].device_id, "99");
    assert!(ledger::list(&conn, None, None).expect("list").is_empty());
}

#[test]
fn test_malformed_row_is_retried_and_other_shards_proceed() {
    let db = setup_test_db("poller_malformed");
    let att = setup_attendance_db("poller_malformed");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 2, "E1")],
    );
    // Text sorts after digits, so this is the newest row of its shard
    add_swipes(&att, "t_lg202504", &[("garbage", 2, "E9")]);

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    let first = poller.tick(&source, &registry, &engine).expect("tick");
    assert_eq!(first.evaluations(), 1);
    assert_eq!(first.failures.len(), 1);
    assert!(first.failures[0].contains("t_lg202504"));

    let second = poller.tick(&source, &registry, &engine).expect("tick");
    let changed: Vec<&str> = second.changed.iter().map(|c| c.shard.as_str()).collect();
    assert_eq!(changed, vec!["t_lg202504"]);
    assert_eq!(second.evaluations(), 0);
}

#[test]
fn test_persisted_snapshot_survives_restart() {
    let db = setup_test_db("poller_persisted");
    let att = setup_attendance_db("poller_persisted");
    let (conn, _) = seeded_ledger(&db);
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 2, "E1")],
    );

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());

    let first = Poller::new(SqliteSnapshot::new(&conn))
        .tick(&source, &registry, &engine)
        .expect("tick");
    assert_eq!(first.evaluations(), 1);

    let restarted = Poller::new(SqliteSnapshot::new(&conn))
        .tick(&source, &registry, &engine)
        .expect("tick");
    assert!(restarted.changed.is_empty());
}

#[test]
fn test_unreachable_store_fails_tick() {
    let db = setup_test_db("poller_unreachable");
    let (conn, _) = seeded_ledger(&db);

    let source = open_source("/nonexistent/dir/attendance.sqlite");
    let clock = FixedClock::new(dt("2025-03-07 12:30:00"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    assert!(poller.tick(&source, &registry, &engine).is_err());
    assert_eq!(poller.state(), PollerState::Idle);
}

#[test]
fn test_store_reconnects_after_failed_listing() {
    let db = setup_test_db("poller_reconnect");
    let att = setup_attendance_db("poller_reconnect");
    let (conn, _) = seeded_ledger(&db);
    // Not a SQLite file: opening succeeds, the first query fails
    std::fs::write(&att, vec![b'x'; 4096]).expect("write garbage");

    let source = open_source(&att);
    let clock = FixedClock::new(dt("2025-03-07 12:30:05"));
    let registry = DeviceRegistry::new(&conn);
    let engine = EligibilityEngine::new(&conn, &source, &clock, EvaluationPolicy::default());
    let mut poller = Poller::new(MemorySnapshot::new());

    assert!(poller.tick(&source, &registry, &engine).is_err());

    std::fs::remove_file(&att).expect("remove garbage");
    add_swipes(
        &att,
        "t_lg202503",
        &[("2025-03-07 08:05:00", 1, "E1"), ("2025-03-07 12:30:00", 2, "E1")],
    );

    let report = poller.tick(&source, &registry, &engine).expect("tick after recovery");
    assert_eq!(report.evaluations(), 1);
    assert_eq!(report.dispatched[0].evaluation.verdict, Verdict::Granted);
}
