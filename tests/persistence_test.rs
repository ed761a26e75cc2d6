#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let payments_path = dir.path().join("payments.csv");

    let mut accounts = tempfile::NamedTempFile::new().unwrap();
    writeln!(accounts, "id, balance, currency").unwrap();
    writeln!(accounts, "alice, 100, USD").unwrap();
    writeln!(accounts, "bob, 0, USD").unwrap();

    // 1. First run: seed and move 60
    let mut transfers1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(transfers1, "from, to, amount").unwrap();
    writeln!(transfers1, "alice, bob, 60").unwrap();

    let output1 = Command::new(cargo_bin!("wallet_ledger"))
        .arg(accounts.path())
        .arg(transfers1.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("alice,40,USD"));

    // 2. Second run: the seed file is re-read but stored balances win
    let mut transfers2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(transfers2, "from, to, amount").unwrap();
    writeln!(transfers2, "alice, bob, 60").unwrap();
    writeln!(transfers2, "bob, alice, 10").unwrap();

    let output2 = Command::new(cargo_bin!("wallet_ledger"))
        .arg(accounts.path())
        .arg(transfers2.path())
        .arg("--db-path")
        .arg(&db_path)
        .arg("--payments-out")
        .arg(&payments_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    // 40 left from the first run is not enough for another 60.
    assert!(stderr2.contains("[LOW_BALANCE]"));
    assert!(stdout2.contains("alice,50,USD"));
    assert!(stdout2.contains("bob,50,USD"));

    // Payment log spans both runs.
    let ledger = std::fs::read_to_string(&payments_path).unwrap();
    assert_eq!(ledger.lines().count(), 1 + 4);
}
