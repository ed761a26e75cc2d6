use crate::domain::account::Account;
use crate::domain::payment::{Direction, PaymentEntry};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRow<'a> {
    id: &'a str,
    balance: Decimal,
    currency: &'a str,
}

#[derive(Serialize)]
struct PaymentRow<'a> {
    account: &'a str,
    direction: Direction,
    counterparty: &'a str,
    amount: Decimal,
}

/// Writes accounts and payment entries as CSV. Decimals are normalized (`80.0` → `80`).
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes an `id,balance,currency` table.
    pub fn write_accounts(&mut self, accounts: impl IntoIterator<Item = Account>) -> Result<()> {
        // Header is written even when there are no rows.
        self.writer.write_record(["id", "balance", "currency"])?;
        for account in accounts {
            self.writer.serialize(AccountRow {
                id: account.id.as_str(),
                balance: account.balance.0.normalize(),
                currency: account.currency.as_str(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes an `account,direction,counterparty,amount` table.
    pub fn write_payments(
        &mut self,
        payments: impl IntoIterator<Item = PaymentEntry>,
    ) -> Result<()> {
        self.writer
            .write_record(["account", "direction", "counterparty", "amount"])?;
        for entry in payments {
            self.writer.serialize(PaymentRow {
                account: entry.account.as_str(),
                direction: entry.direction,
                counterparty: entry.counterparty.as_str(),
                amount: entry.amount.value().normalize(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
