use mealgate::db::ledger;
use mealgate::models::transaction::{NewTransaction, TxStatus};

mod common;
use common::{add_window, dt, seeded_ledger, setup_test_db};

fn lunch_grant(employee: &str, at: &str, window_id: i64) -> NewTransaction {
    NewTransaction {
        employee_id: employee.to_string(),
        event_time: dt(at),
        matched_entry_time: Some(dt("2025-03-07 08:05:00")),
        shift_start_time: None,
        status: TxStatus::Granted,
        description: "Coupon granted".to_string(),
        window_id,
        window_name: "Lunch".to_string(),
    }
}

#[test]
fn test_second_grant_for_same_key_is_rejected() {
    let db = setup_test_db("ledger_unique_grant");
    let (conn, lunch) = seeded_ledger(&db);

    ledger::record(&conn, &lunch_grant("E1", "2025-03-07 12:30:00", lunch)).expect("first grant");

    let err = ledger::record(&conn, &lunch_grant("E1", "2025-03-07 13:10:00", lunch));
    assert!(err.is_err());
    assert_eq!(
        ledger::count_by_status(&conn, TxStatus::Granted).expect("count"),
        1
    );
}

#[test]
fn test_grants_on_other_day_or_window_are_accepted() {
    let db = setup_test_db("ledger_other_keys");
    let (conn, lunch) = seeded_ledger(&db);
    let dinner = add_window(&conn, "Dinner", "19:00", "21:00");

    ledger::record(&conn, &lunch_grant("E1", "2025-03-07 12:30:00", lunch)).expect("grant");
    ledger::record(&conn, &lunch_grant("E1", "2025-03-08 12:30:00", lunch)).expect("next day");
    ledger::record(&conn, &lunch_grant("E1", "2025-03-07 19:30:00", dinner))
        .expect("other window");
    ledger::record(&conn, &lunch_grant("E2", "2025-03-07 12:30:00", lunch))
        .expect("other employee");

    assert_eq!(
        ledger::count_by_status(&conn, TxStatus::Granted).expect("count"),
        4
    );
}

#[test]
fn test_denied_rows_may_repeat() {
    let db = setup_test_db("ledger_denied_repeat");
    let (conn, lunch) = seeded_ledger(&db);
    let denied = lunch_grant("E1", "2025-03-07 12:30:00", lunch)
        .with_status(TxStatus::DeniedNoEntry, "No entry swipe");

    ledger::record(&conn, &denied).expect("first denial");
    ledger::record(&conn, &denied).expect("second denial");

    assert_eq!(
        ledger::count_by_status(&conn, TxStatus::DeniedNoEntry).expect("count"),
        2
    );
}

#[test]
fn test_grant_once_after_existing_grant_is_duplicate() {
    let db = setup_test_db("ledger_grant_once");
    let (conn, lunch) = seeded_ledger(&db);

    // A grant written by another process
    ledger::record(&conn, &lunch_grant("E1", "2025-03-07 12:30:00", lunch)).expect("grant");

    let retry = lunch_grant("E1", "2025-03-07 12:31:00", lunch);
    let (status, _) = ledger::grant_once(&conn, &retry).expect("grant once");
    assert_eq!(status, TxStatus::DeniedDuplicate);

    let rows = ledger::list(&conn, None, Some("E1")).expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].status, TxStatus::DeniedDuplicate);
    assert_eq!(rows[1].description, ledger::DUPLICATE_DESCRIPTION);
    assert_eq!(
        ledger::count_by_status(&conn, TxStatus::Granted).expect("count"),
        1
    );

    let next_day = lunch_grant("E1", "2025-03-08 12:30:00", lunch);
    let (status, _) = ledger::grant_once(&conn, &next_day).expect("grant once");
    assert_eq!(status, TxStatus::Granted);
}
