use chrono::Duration;
use chrono_tz::Tz;
use mealgate::attendance::ShardPattern;
use mealgate::config::Config;
use mealgate::models::device::normalize_device_id;
use mealgate::utils::time::{TimeZoneSetting, WindowClock, parse_time, within_tolerance};

fn t(s: &str) -> chrono::NaiveTime {
    parse_time(s).expect("valid time")
}

#[test]
fn test_tolerance_wraps_over_midnight() {
    let hour = Duration::hours(1);
    assert!(within_tolerance(t("23:30"), t("00:15"), hour));
    assert!(within_tolerance(t("00:15"), t("23:30"), hour));
    assert!(within_tolerance(t("22:00"), t("23:00"), hour));
    assert!(!within_tolerance(t("22:00"), t("23:00:01"), hour));
    assert!(!within_tolerance(t("08:00"), t("20:00"), hour));
}

#[test]
fn test_time_zone_setting_parse() {
    assert_eq!(TimeZoneSetting::parse("local"), Some(TimeZoneSetting::Local));
    assert_eq!(TimeZoneSetting::parse(" Local "), Some(TimeZoneSetting::Local));
    assert_eq!(
        TimeZoneSetting::parse("UTC"),
        Some(TimeZoneSetting::Named(Tz::UTC))
    );
    assert_eq!(
        TimeZoneSetting::parse("Asia/Kolkata"),
        Some(TimeZoneSetting::Named(Tz::Asia__Kolkata))
    );
    assert_eq!(
        TimeZoneSetting::parse("America/New_York"),
        Some(TimeZoneSetting::Named(Tz::America__New_York))
    );
    assert_eq!(TimeZoneSetting::parse("Mars/Olympus"), None);
    assert_eq!(TimeZoneSetting::parse("+05:30"), None);
}

#[test]
fn test_unix_timestamps_follow_zone() {
    let utc = TimeZoneSetting::parse("UTC").expect("zone");
    let kolkata = TimeZoneSetting::parse("Asia/Kolkata").expect("zone");
    // 2025-03-07 12:00:00 UTC
    let secs = 1_741_348_800;
    assert_eq!(
        utc.from_unix(secs).map(|d| d.to_string()),
        Some("2025-03-07 12:00:00".to_string())
    );
    assert_eq!(
        kolkata.from_unix(secs).map(|d| d.to_string()),
        Some("2025-03-07 17:30:00".to_string())
    );
}

#[test]
fn test_named_zone_follows_daylight_saving() {
    let new_york = TimeZoneSetting::parse("America/New_York").expect("zone");
    // 2025-01-15 12:00:00 UTC (EST) and 2025-07-15 12:00:00 UTC (EDT)
    assert_eq!(
        new_york.from_unix(1_736_942_400).map(|d| d.to_string()),
        Some("2025-01-15 07:00:00".to_string())
    );
    assert_eq!(
        new_york.from_unix(1_752_580_800).map(|d| d.to_string()),
        Some("2025-07-15 08:00:00".to_string())
    );
}

#[test]
fn test_shard_pattern() {
    let p = ShardPattern::new("t_lg").expect("pattern");
    assert!(p.matches("t_lg202503"));
    assert!(!p.matches("t_lg20250"));
    assert!(!p.matches("t_lg2025031"));
    assert!(!p.matches("x_t_lg202503"));
    assert!(!p.matches("t_lgABCDEF"));
    assert!(p.quoted("users; DROP TABLE devices").is_err());
    assert_eq!(p.quoted("t_lg202503").expect("quoted"), "\"t_lg202503\"");
}

#[test]
fn test_device_id_normalization() {
    assert_eq!(normalize_device_id(" 007 "), "7");
    assert_eq!(normalize_device_id("GATE-A"), "GATE-A");
}

#[test]
fn test_config_validation() {
    let cfg = Config::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.clock_policy().expect("clock"), WindowClock::Now);

    let kolkata = Config {
        time_zone: "Asia/Kolkata".into(),
        ..Config::default()
    };
    assert!(kolkata.validate().is_ok());

    let bad_zone = Config {
        time_zone: "Mars/Olympus".into(),
        ..Config::default()
    };
    assert!(bad_zone.validate().is_err());

    let bad_prefix = Config {
        table_prefix: "t;lg".into(),
        ..Config::default()
    };
    assert!(bad_prefix.validate().is_err());

    let event_clock = Config {
        window_clock: "event".into(),
        ..Config::default()
    };
    assert_eq!(
        event_clock.evaluation_policy().expect("policy").window_clock,
        WindowClock::EventTime
    );
}
