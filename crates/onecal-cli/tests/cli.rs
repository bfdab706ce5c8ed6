//! Integration tests for the onecal CLI
//!
//! Every invocation pins `--now` to Wednesday, February 18, 2026 10:00.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const NOW: &str = "2026-02-18T10:00";

/// Helper to create a CLI command with a fixed clock
fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_onecal"));
    cmd.args(["--now", NOW]);
    cmd
}

// ============ PARSE ============

#[test]
fn test_parse_prints_draft_json() {
    let output = cli()
        .args(["parse", "Meeting with Sarah tomorrow at 3pm"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let draft: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(draft["title"], "Meeting");
    assert_eq!(draft["date"], "2026-02-19");
    assert_eq!(draft["time"], "15:00:00");
    assert!(draft["location"].is_null());
}

#[test]
fn test_parse_binds_known_calendar() {
    let output = cli()
        .args(["parse", "Soccer practice tomorrow at 5pm for Family"])
        .output()
        .unwrap();
    let draft: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(draft["title"], "Soccer practice");
    assert_eq!(draft["calendar"], "Family");
    assert_eq!(draft["time"], "17:00:00");
}

#[test]
fn test_invalid_now_is_rejected() {
    Command::new(env!("CARGO_BIN_EXE_onecal"))
        .args(["--now", "yesterday", "parse", "Lunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DDTHH:MM"));
}

// ============ WEEK NUMBER ============

#[test]
fn test_week_number_year_boundaries() {
    cli()
        .args(["week-number", "2021-01-04"])
        .assert()
        .success()
        .stdout("1\n");
    cli()
        .args(["week-number", "2020-12-31"])
        .assert()
        .success()
        .stdout("53\n");
}

#[test]
fn test_week_number_rejects_bad_date() {
    cli()
        .args(["week-number", "2026-02-30"])
        .assert()
        .failure();
}

// ============ VIEW ============

#[test]
fn test_week_view_title() {
    cli()
        .args(["view", "--kind", "week", "--date", "2026-02-18"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Feb 15 - Feb 21\n"))
        .stdout(predicate::str::contains("No events"));
}

#[test]
fn test_week_view_honours_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("settings.toml");
    fs::write(&config, "week_starts_on = 1\ntime_format = \"24\"\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .args(["view", "--kind", "week"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Feb 16 - Feb 22\n"));
}

#[test]
fn test_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("settings.toml");
    fs::write(&config, "week_starts_on = 9\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .args(["view"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load settings"));
}

#[test]
fn test_month_view_marks_today() {
    cli()
        .args(["view", "--kind", "month"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("February 2026\n"))
        .stdout(predicate::str::contains("[18]"));
}

#[test]
fn test_list_view_title() {
    cli()
        .args(["view", "--kind", "agenda"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Next 30 Days\n"));
}

// ============ ADD / SEARCH ============

#[test]
fn test_add_then_view_and_search() {
    let dir = TempDir::new().unwrap();
    let events = dir.path().join("events.json");

    cli()
        .arg("--events")
        .arg(&events)
        .args(["add", "Dentist friday at 9:30am for Personal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added event 1:"))
        .stdout(predicate::str::contains("Feb 20 9:30 AM  Dentist [personal]"));
    assert!(events.exists());

    cli()
        .arg("--events")
        .arg(&events)
        .args(["view", "--kind", "day", "--date", "2026-02-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Friday, February 20, 2026"))
        .stdout(predicate::str::contains("Dentist"));

    cli()
        .arg("--events")
        .arg(&events)
        .args(["search", "DENT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dentist"));

    // A second add gets the next id
    cli()
        .arg("--events")
        .arg(&events)
        .args(["add", "Lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added event 2:"))
        .stdout(predicate::str::contains("Feb 18 10:30 AM  Lunch [personal]"));
}

#[test]
fn test_add_requires_events_file() {
    cli()
        .args(["add", "Lunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--events"));
}

#[test]
fn test_search_short_query_matches_nothing() {
    cli()
        .args(["search", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches for 'a'"));
}

// ============ HOLIDAYS ============

#[test]
fn test_holidays_merge_once() {
    let dir = TempDir::new().unwrap();
    let events = dir.path().join("events.json");

    cli()
        .arg("--events")
        .arg(&events)
        .args(["holidays", "--year", "2026"])
        .assert()
        .success()
        .stdout("Added 11 holidays\n");
    cli()
        .arg("--events")
        .arg(&events)
        .args(["holidays", "--year", "2026"])
        .assert()
        .success()
        .stdout("Added 0 holidays\n");

    cli()
        .arg("--events")
        .arg(&events)
        .args(["view", "--kind", "day", "--date", "2026-12-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Victory Day"));
}
