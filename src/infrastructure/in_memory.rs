use super::locks::{AccountLocks, LockSet};
use super::staging::Staged;
use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::payment::PaymentEntry;
use crate::domain::ports::{AccountStore, AtomicUnit, LedgerBackend, LedgerStore, QueryStore};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Committed state: an arena of accounts indexed by id, plus the payment log.
#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    index: HashMap<AccountId, usize>,
    payments: Vec<PaymentEntry>,
}

impl State {
    fn account(&self, id: &AccountId) -> Option<&Account> {
        self.index.get(id).map(|&slot| &self.accounts[slot])
    }
}

/// A thread-safe in-memory ledger backend.
///
/// Committed state sits behind `Arc<RwLock<..>>`; exclusive access to individual
/// balances goes through a per-account lock table rather than one global lock.
/// `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
    locks: AccountLocks,
}

impl InMemoryBackend {
    /// Creates a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `accounts`. Later duplicates are ignored.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let mut state = State::default();
        for account in accounts {
            if state.index.contains_key(&account.id) {
                continue;
            }
            state.index.insert(account.id.clone(), state.accounts.len());
            state.accounts.push(account);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
            locks: AccountLocks::new(),
        }
    }
}

#[async_trait]
impl LedgerBackend for InMemoryBackend {
    async fn begin(&self) -> StoreResult<Box<dyn AtomicUnit>> {
        Ok(Box::new(InMemoryUnit {
            state: Arc::clone(&self.state),
            locks: self.locks.clone(),
            held: LockSet::default(),
            staged: Staged::default(),
            committed: false,
        }))
    }

    async fn open_account(&self, account: Account) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.index.contains_key(&account.id) {
            return Err(StoreError::DuplicateAccount(account.id.to_string()));
        }
        let slot = state.accounts.len();
        state.index.insert(account.id.clone(), slot);
        state.accounts.push(account);
        Ok(())
    }
}

#[async_trait]
impl QueryStore for InMemoryBackend {
    async fn find_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.account(id).cloned())
    }

    async fn list_accounts(&self, offset: usize, limit: usize) -> StoreResult<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<&Account> = state.accounts.iter().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_accounts(&self) -> StoreResult<usize> {
        Ok(self.state.read().await.accounts.len())
    }

    async fn list_payments(&self, offset: usize, limit: usize) -> StoreResult<Vec<PaymentEntry>> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_payments(&self) -> StoreResult<usize> {
        Ok(self.state.read().await.payments.len())
    }
}

/// One open atomic unit against an [`InMemoryBackend`].
pub struct InMemoryUnit {
    state: Arc<RwLock<State>>,
    locks: AccountLocks,
    held: LockSet,
    staged: Staged,
    committed: bool,
}

impl InMemoryUnit {
    async fn read(&self, id: &AccountId) -> Option<Account> {
        let state = self.state.read().await;
        self.staged.view(state.account(id).cloned())
    }
}

#[async_trait]
impl AccountStore for InMemoryUnit {
    async fn get_for_update(&mut self, id: &AccountId) -> StoreResult<Option<Account>> {
        // Accounts are never deleted, so an id missing now stays missing.
        if !self.state.read().await.index.contains_key(id) {
            return Ok(None);
        }
        self.held.hold(&self.locks, id).await;
        Ok(self.read(id).await)
    }

    async fn get(&mut self, id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.read(id).await)
    }

    async fn adjust_balance(&mut self, id: &AccountId, delta: Balance) -> StoreResult<()> {
        if !self.state.read().await.index.contains_key(id) {
            return Err(StoreError::Constraint(format!("account {id} does not exist")));
        }
        self.staged.adjust(id, delta);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryUnit {
    async fn append(&mut self, entry: PaymentEntry) -> StoreResult<()> {
        self.staged.append(entry);
        Ok(())
    }
}

#[async_trait]
impl AtomicUnit for InMemoryUnit {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut unit = self;
        let shared = Arc::clone(&unit.state);
        let mut state = shared.write().await;
        // Nothing below awaits, so the whole unit lands under one write guard.
        let settled = unit.staged.settle(|id| Ok(state.account(id).cloned()))?;
        for account in settled {
            let slot = state.index[&account.id];
            state.accounts[slot] = account;
        }
        let entries = std::mem::take(&mut unit.staged).into_entries();
        state.payments.extend(entries);
        drop(state);
        unit.committed = true;
        debug!(locks = unit.held.len(), "unit committed");
        Ok(())
    }
}

impl Drop for InMemoryUnit {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            debug!(locks = self.held.len(), "unit aborted, staged changes discarded");
        }
    }
}
