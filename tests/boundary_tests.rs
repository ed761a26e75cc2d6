use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn run(accounts: &str, transfers: &str) -> assert_cmd::assert::Assert {
    let dir = tempdir().unwrap();
    let accounts_path = dir.path().join("accounts.csv");
    let transfers_path = dir.path().join("transfers.csv");
    std::fs::write(&accounts_path, accounts).unwrap();
    std::fs::write(&transfers_path, transfers).unwrap();

    Command::new(cargo_bin!("wallet_ledger"))
        .arg(&accounts_path)
        .arg(&transfers_path)
        .assert()
}

#[test]
fn test_boundary_numerical_values() {
    run(
        "id,balance,currency\nwhale,1000000000.0000,USD\nminnow,0,USD\n",
        "from,to,amount\nwhale,minnow,999999999.9999\n",
    )
    .success()
    .stdout(predicate::str::contains("id,balance,currency"))
    .stdout(predicate::str::contains("whale,0.0001,USD"))
    .stdout(predicate::str::contains("minnow,999999999.9999,USD"));
}

#[test]
fn test_extreme_decimal_precision() {
    run(
        "id,balance,currency\nalice,0.0002,USD\nbob,0,USD\n",
        "from,to,amount\nalice,bob,0.0001\nalice,bob,0.0001\nalice,bob,0.0001\n",
    )
    .success()
    .stderr(predicate::str::contains("[LOW_BALANCE]"))
    .stdout(predicate::str::contains("alice,0,USD"))
    .stdout(predicate::str::contains("bob,0.0002,USD"));
}

#[test]
fn test_spending_the_exact_balance() {
    run(
        "id,balance,currency\nalice,100,USD\nbob,0,USD\n",
        "from,to,amount\nalice,bob,100\nalice,bob,0.01\n",
    )
    .success()
    .stdout(predicate::str::contains("alice,0,USD"))
    .stdout(predicate::str::contains("bob,100,USD"));
}

#[test]
fn test_empty_transfer_file() {
    run("id,balance,currency\nalice,5,USD\n", "from,to,amount\n")
        .success()
        .stdout(predicate::str::contains("alice,5,USD"));
}
