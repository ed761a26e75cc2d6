use crate::domain::account::AccountId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Table of per-account exclusive locks.
///
/// One async mutex per account id, so transfers over disjoint accounts never contend.
/// Waiters are granted the lock in FIFO order.
#[derive(Default, Clone)]
pub struct AccountLocks {
    slots: Arc<Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `id`. Access lasts until the guard is dropped.
    pub async fn acquire(&self, id: &AccountId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(id.clone()).or_default().clone()
        };
        trace!(account = %id, "waiting for account lock");
        slot.lock_owned().await
    }
}

/// The exclusive holds taken by one atomic unit.
#[derive(Default)]
pub struct LockSet {
    held: HashMap<AccountId, OwnedMutexGuard<()>>,
}

impl LockSet {
    /// Acquires `id` unless this set already holds it.
    pub async fn hold(&mut self, locks: &AccountLocks, id: &AccountId) {
        if self.held.contains_key(id) {
            return;
        }
        let guard = locks.acquire(id).await;
        self.held.insert(id.clone(), guard);
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}
