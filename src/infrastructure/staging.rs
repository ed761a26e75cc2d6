use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::payment::PaymentEntry;
use crate::error::{StoreError, StoreResult};

/// Changes buffered by an open unit until commit.
#[derive(Default, Debug)]
pub struct Staged {
    deltas: Vec<(AccountId, Balance)>,
    entries: Vec<PaymentEntry>,
}

impl Staged {
    pub fn adjust(&mut self, id: &AccountId, delta: Balance) {
        match self.deltas.iter_mut().find(|(staged, _)| staged == id) {
            Some((_, total)) => *total += delta,
            None => self.deltas.push((id.clone(), delta)),
        }
    }

    pub fn append(&mut self, entry: PaymentEntry) {
        self.entries.push(entry);
    }

    /// Sum of deltas staged for `id`.
    pub fn pending(&self, id: &AccountId) -> Balance {
        self.deltas
            .iter()
            .filter(|(staged, _)| staged == id)
            .map(|(_, delta)| *delta)
            .sum()
    }

    /// Overlays this unit's pending delta onto a committed read.
    pub fn view(&self, account: Option<Account>) -> Option<Account> {
        account.map(|mut account| {
            account.balance += self.pending(&account.id);
            account
        })
    }

    /// Computes the post-commit state of every touched account.
    ///
    /// `current` looks up the committed account. Fails without side effects when an
    /// account is missing or would end up with a negative balance.
    pub fn settle<F>(&self, mut current: F) -> StoreResult<Vec<Account>>
    where
        F: FnMut(&AccountId) -> StoreResult<Option<Account>>,
    {
        let mut settled = Vec::with_capacity(self.deltas.len());
        for (id, delta) in &self.deltas {
            let mut account = current(id)?.ok_or_else(|| {
                StoreError::Constraint(format!("account {id} does not exist"))
            })?;
            account.balance += *delta;
            if account.balance.is_negative() {
                return Err(StoreError::Constraint(format!(
                    "balance of account {id} would become negative"
                )));
            }
            settled.push(account);
        }
        Ok(settled)
    }

    pub fn into_entries(self) -> Vec<PaymentEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty() && self.entries.is_empty()
    }
}
