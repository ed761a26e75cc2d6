use super::account::{Account, AccountId, Balance};
use super::payment::PaymentEntry;
use crate::error::StoreResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Account operations available inside an open atomic unit.
#[async_trait]
pub trait AccountStore: Send {
    /// Reads the account and takes exclusive access to its balance until the unit ends.
    ///
    /// Re-entrant within one unit. Returns `None` without locking when the id is unknown.
    async fn get_for_update(&mut self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Non-exclusive read. Reflects deltas already staged by this unit.
    async fn get(&mut self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Stages a signed balance change, applied only on commit.
    async fn adjust_balance(&mut self, id: &AccountId, delta: Balance) -> StoreResult<()>;
}

/// Ledger operations available inside an open atomic unit.
#[async_trait]
pub trait LedgerStore: Send {
    /// Stages one payment entry, recorded only on commit.
    async fn append(&mut self, entry: PaymentEntry) -> StoreResult<()>;
}

/// A group of staged account and ledger changes made visible together or not at all.
///
/// Dropping a unit without calling [`AtomicUnit::commit`] aborts it: staged changes are
/// discarded and every exclusive hold is released.
#[async_trait]
pub trait AtomicUnit: AccountStore + LedgerStore {
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Write-side entry point of a storage backend.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn AtomicUnit>>;

    /// Creates an account outside of any transfer. Fails if the id is taken.
    async fn open_account(&self, account: Account) -> StoreResult<()>;
}

/// Read-only listing used by the query service.
#[async_trait]
pub trait QueryStore: Send + Sync {
    async fn find_account(&self, id: &AccountId) -> StoreResult<Option<Account>>;
    /// Accounts ordered by id.
    async fn list_accounts(&self, offset: usize, limit: usize) -> StoreResult<Vec<Account>>;
    async fn count_accounts(&self) -> StoreResult<usize>;
    /// Payments in insertion order.
    async fn list_payments(&self, offset: usize, limit: usize) -> StoreResult<Vec<PaymentEntry>>;
    async fn count_payments(&self) -> StoreResult<usize>;
}

pub trait Backend: LedgerBackend + QueryStore {}

impl<T: LedgerBackend + QueryStore> Backend for T {}

pub type BackendHandle = Arc<dyn Backend>;
