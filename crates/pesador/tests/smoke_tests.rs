//! Smoke tests for the pesador CLI

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pesador() -> Command {
    Command::cargo_bin("pesador").expect("pesador binary should exist")
}

#[test]
fn test_version_flag() {
    pesador().arg("--version").assert().success();
}

#[test]
fn test_help_flag() {
    pesador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_no_args_shows_help() {
    pesador().assert().failure(); // Requires a subcommand
}

#[test]
fn test_run_subcommand_help() {
    pesador()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--filter"));
}

#[test]
fn test_init_then_dry_run() {
    let dir = TempDir::new().unwrap();

    pesador()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(dir.path().join("pesar.yaml").exists());
    assert!(dir.path().join("scenarios/bmi.yaml").exists());

    pesador()
        .current_dir(dir.path())
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passed"));
}

#[test]
fn test_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    pesador()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    pesador()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_list_shows_scaffolded_scenario() {
    let dir = TempDir::new().unwrap();
    pesador()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    pesador()
        .current_dir(dir.path())
        .args(["list", "--cases"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bmi"))
        .stdout(predicate::str::contains("pre-filled"));
}

#[test]
fn test_failing_dry_run_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("scenarios")).unwrap();
    std::fs::write(
        dir.path().join("scenarios/broken.yaml"),
        r#"
name: "broken"
cases:
  - name: "impossible expectation"
    steps:
      - type: visit
        url: "/bmi-calculator"
      - type: click_calculate
      - type: expect_contains
        text: "this text never renders"
"#,
    )
    .unwrap();

    pesador()
        .current_dir(dir.path())
        .args(["run", "--dry-run"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed"));
}
