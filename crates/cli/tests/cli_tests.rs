//! End-to-end tests that run the `atm` binary against a temporary database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn atm(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("atm").unwrap();
    cmd.env("RUST_LOG", "off")
        .env_remove("ATM_PIN")
        .arg("--db")
        .arg(db);
    cmd
}

#[test]
fn test_register_deposit_and_balance() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("atm.db");

    atm(&db).arg("init").assert().success();
    atm(&db)
        .args(["register", "--name", "alice", "--pin", "1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account ID: 1"));

    atm(&db)
        .args(["deposit", "--name", "alice", "--pin", "1234", "150000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance: 150,000"));

    atm(&db)
        .args(["balance", "--name", "alice", "--pin", "1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150,000"));
}

#[test]
fn test_duplicate_register_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("atm.db");

    atm(&db)
        .args(["register", "--name", "alice", "--pin", "1234"])
        .assert()
        .success();
    atm(&db)
        .args(["register", "--name", "alice", "--pin", "9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already taken"));
}

#[test]
fn test_wrong_pin_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("atm.db");

    atm(&db)
        .args(["register", "--name", "alice", "--pin", "1234"])
        .assert()
        .success();
    atm(&db)
        .args(["balance", "--name", "alice", "--pin", "0000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login failed"));
}

#[test]
fn test_transfer_and_json_history() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("atm.db");

    for name in ["alice", "budi"] {
        atm(&db)
            .args(["register", "--name", name, "--pin", "1234"])
            .assert()
            .success();
    }
    atm(&db)
        .args(["deposit", "-n", "alice", "-p", "1234", "100"])
        .assert()
        .success();
    atm(&db)
        .args(["transfer", "-n", "alice", "-p", "1234", "2", "40", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recipient: budi"))
        .stdout(predicate::str::contains("Balance: 60"));

    atm(&db)
        .args(["history", "-n", "budi", "-p", "1234", "--type", "transfer_in", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"transfer_in\""))
        .stdout(predicate::str::contains("\"counterparty_name\": \"alice\""));

    atm(&db)
        .args(["history", "-n", "budi", "-p", "1234", "--type", "withdraw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No withdraw history"));

    atm(&db)
        .args(["reconcile", "-n", "alice", "-p", "1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Consistent"));
}

#[test]
fn test_unusable_data_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file.txt");
    std::fs::write(&blocker, "not a directory").unwrap();
    let db = blocker.join("atm.db");

    atm(&db)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create data directory"));
    assert!(blocker.is_file());
}
