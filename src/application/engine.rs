use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::payment::{PaymentEntry, TransferRequest};
use crate::domain::ports::{AccountStore, BackendHandle, LedgerBackend, LedgerStore};
use crate::error::TransferError;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Moves money between two accounts as one atomic unit.
///
/// `TransferEngine` is cheap to clone and safe to share between tasks. It keeps no
/// account state of its own: every transfer re-reads the source balance under exclusive
/// access, so concurrent transfers from the same account serialize on that account only.
#[derive(Clone)]
pub struct TransferEngine {
    backend: BackendHandle,
}

impl TransferEngine {
    /// Creates a new `TransferEngine` over a storage backend.
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    /// Transfers `amount` from one account to another, bounded by `deadline`.
    ///
    /// Checks run in a fixed order and the first failure wins: same account, non-positive
    /// amount, unknown source, unknown destination, currency mismatch, insufficient funds.
    /// On success both payment entries and both balance changes are committed together.
    /// If the deadline passes first the open unit is dropped, which aborts it. A deadline
    /// that has already passed never opens a unit, even when nothing would block.
    pub async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
        deadline: Instant,
    ) -> Result<(), TransferError> {
        match tokio::time::timeout_at(deadline, self.execute(from, to, amount, deadline)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(from = %from, to = %to, %amount, "transfer deadline exceeded");
                Err(TransferError::Timeout)
            }
        }
    }

    /// Runs a decoded request with a deadline of `timeout` from now.
    pub async fn submit(
        &self,
        request: &TransferRequest,
        timeout: Duration,
    ) -> Result<(), TransferError> {
        let deadline = Instant::now() + timeout;
        self.transfer(&request.from, &request.to, request.amount, deadline)
            .await
    }

    async fn execute(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
        deadline: Instant,
    ) -> Result<(), TransferError> {
        if from == to {
            return Err(TransferError::SameAccount);
        }
        let amount = Amount::new(amount).map_err(|_| TransferError::InvalidAmount)?;

        // An uncontended unit never yields, so `timeout_at` alone would not stop it.
        check_deadline(deadline)?;
        let mut unit = self.backend.begin().await?;

        // Exclusive from here until the unit is committed or dropped.
        let source = unit
            .get_for_update(from)
            .await?
            .ok_or(TransferError::SourceNotFound)?;
        let destination = unit
            .get(to)
            .await?
            .ok_or(TransferError::DestinationNotFound)?;

        if source.currency != destination.currency {
            return Err(TransferError::CurrencyMismatch {
                from: source.currency,
                to: destination.currency,
            });
        }
        if !source.can_afford(amount) {
            debug!(account = %from, balance = %source.balance, %amount, "insufficient funds");
            return Err(TransferError::InsufficientFunds);
        }

        for entry in PaymentEntry::pair(from, to, amount) {
            unit.append(entry).await?;
        }
        unit.adjust_balance(from, -Balance::from(amount)).await?;
        unit.adjust_balance(to, Balance::from(amount)).await?;
        check_deadline(deadline)?;
        unit.commit().await?;

        debug!(from = %from, to = %to, %amount, "transfer committed");
        Ok(())
    }
}

fn check_deadline(deadline: Instant) -> Result<(), TransferError> {
    if Instant::now() >= deadline {
        return Err(TransferError::Timeout);
    }
    Ok(())
}
