#![allow(dead_code)]

use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wallet_ledger::domain::account::{Account, AccountId, Balance, Currency};
use wallet_ledger::infrastructure::in_memory::InMemoryBackend;

pub fn id(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

pub fn account(name: &str, balance: Decimal, currency: &str) -> Account {
    Account::new(id(name), Balance::new(balance), Currency::new(currency).unwrap())
}

/// alice, bob, mark and john hold 100 USD each; kate_in_europe holds 100 EUR.
pub fn wallet() -> Arc<InMemoryBackend> {
    let hundred = Decimal::from(100);
    Arc::new(InMemoryBackend::with_accounts([
        account("alice", hundred, "USD"),
        account("bob", hundred, "USD"),
        account("mark", hundred, "USD"),
        account("john", hundred, "USD"),
        account("kate_in_europe", hundred, "EUR"),
    ]))
}

pub fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

pub fn write_accounts_csv(path: &Path, accounts: usize, balance: u64) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "balance", "currency"])?;
    for i in 1..=accounts {
        wtr.write_record([format!("acc{i}"), balance.to_string(), "USD".to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `rows` transfers cycling through `accounts` accounts, each moving `amount`
/// from `acc{n}` to `acc{n+1}`.
pub fn write_transfers_csv(
    path: &Path,
    rows: usize,
    accounts: usize,
    amount: &str,
) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["from", "to", "amount"])?;
    for i in 0..rows {
        let from = i % accounts + 1;
        let to = from % accounts + 1;
        wtr.write_record([format!("acc{from}"), format!("acc{to}"), amount.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}
