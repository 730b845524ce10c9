//! Exit status of the `office-hours` binary.
//!
//! 0 for a completed run, 22 for wrong usage, 1 for any run that fails
//! at startup or mid-simulation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use oh_test_utils::write_arrival_file;
use predicates::prelude::*;

/// The binary with fast virtual units and no inherited `OH_*` overrides.
fn office_hours() -> Command {
    let mut cmd = Command::cargo_bin("office-hours").unwrap();
    cmd.env("OH_TIME_UNIT_MS", "1")
        .env("RUST_LOG", "office_hours=info")
        .env_remove("OH_SEATS")
        .env_remove("OH_PROFESSOR_LIMIT")
        .env_remove("OH_CONSECUTIVE_LIMIT")
        .env_remove("OH_MAX_STUDENTS")
        .env_remove("OH_BREAK_UNITS")
        .env_remove("OH_REPORT_PATH");
    cmd
}

#[test]
fn test_completed_run_exits_zero() {
    let file = write_arrival_file("0 0 1\n1 0 1\n0 1 1\n");

    office_hours()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Office hour simulation done"));
}

#[test]
fn test_report_written_when_path_set() {
    let file = write_arrival_file("1 0 1\n1 0 2\n");
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");

    office_hours()
        .env("OH_REPORT_PATH", &report_path)
        .arg(file.path())
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["students"], 2);
    assert!(report["history"].is_array());
}

#[test]
fn test_wrong_usage_exits_22() {
    office_hours().assert().code(22);

    office_hours().args(["a.txt", "b.txt"]).assert().code(22);
}

#[test]
fn test_startup_failures_exit_one() {
    office_hours()
        .arg("/nonexistent/arrivals.txt")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("could not start"));

    let empty = write_arrival_file("");
    office_hours().arg(empty.path()).assert().code(1);

    let bad_class = write_arrival_file("0 0 1\n3 0 1\n");
    office_hours().arg(bad_class.path()).assert().code(1);

    let arrivals = write_arrival_file("0 0 1\n");
    office_hours()
        .env("OH_SEATS", "0")
        .arg(arrivals.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("could not start"));
}

#[test]
fn test_too_many_students_exits_one() {
    let file = write_arrival_file("0 0 1\n1 0 1\n0 0 1\n");

    office_hours()
        .env("OH_MAX_STUDENTS", "2")
        .arg(file.path())
        .assert()
        .code(1);
}
