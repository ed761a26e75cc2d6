use crate::domain::account::Account;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads seed accounts from a CSV source with an `id, balance, currency` header.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn accounts(self) -> impl Iterator<Item = Result<Account>> {
        self.reader
            .into_deserialize()
            .map(|result: std::result::Result<Account, csv::Error>| {
                let account = result?;
                if account.balance.is_negative() {
                    return Err(LedgerError::ValidationError(format!(
                        "account {} has a negative opening balance",
                        account.id
                    )));
                }
                Ok(account)
            })
    }
}
