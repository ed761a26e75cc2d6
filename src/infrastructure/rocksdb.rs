use super::locks::{AccountLocks, LockSet};
use super::staging::Staged;
use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::payment::PaymentEntry;
use crate::domain::ports::{AccountStore, AtomicUnit, LedgerBackend, LedgerStore, QueryStore};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Column Family for storing account states.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing the payment log, keyed by big-endian sequence number.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent ledger backend using RocksDB.
///
/// Accounts and payments live in separate Column Families. A unit's staged changes are
/// written as one `WriteBatch`, so a commit is all-or-nothing on disk. Exclusive access to
/// balances uses the same per-account lock table as the in-memory backend.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBBackend {
    db: Arc<DB>,
    locks: AccountLocks,
    /// Next payment sequence number. Also serializes commits.
    next_seq: Arc<Mutex<u64>>,
}

impl RocksDBBackend {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("accounts" and "payments") exist and
    /// resumes the payment sequence after the last stored entry.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_payments])?;

        let next_seq = {
            let cf = cf(&db, CF_PAYMENTS)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_seq(&key)? + 1
                }
                None => 0,
            }
        };
        info!(next_seq, "opened RocksDB ledger");

        Ok(Self {
            db: Arc::new(db),
            locks: AccountLocks::new(),
            next_seq: Arc::new(Mutex::new(next_seq)),
        })
    }

    fn read_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        read_account(&self.db, id)
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> StoreResult<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Internal(format!("{name} column family not found")))
}

fn decode_seq(key: &[u8]) -> StoreResult<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::Internal("malformed payment key".to_string()))?;
    Ok(u64::from_be_bytes(bytes))
}

fn read_account(db: &DB, id: &AccountId) -> StoreResult<Option<Account>> {
    match db.get_cf(cf(db, CF_ACCOUNTS)?, id.as_str().as_bytes())? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl LedgerBackend for RocksDBBackend {
    async fn begin(&self) -> StoreResult<Box<dyn AtomicUnit>> {
        Ok(Box::new(RocksDBUnit {
            backend: self.clone(),
            held: LockSet::default(),
            staged: Staged::default(),
        }))
    }

    async fn open_account(&self, account: Account) -> StoreResult<()> {
        // Creation shares the commit path's serialization so it cannot race a settle.
        let _commit = self.next_seq.lock().await;
        if self.read_account(&account.id)?.is_some() {
            return Err(StoreError::DuplicateAccount(account.id.to_string()));
        }
        let value = serde_json::to_vec(&account)?;
        self.db
            .put_cf(cf(&self.db, CF_ACCOUNTS)?, account.id.as_str().as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl QueryStore for RocksDBBackend {
    async fn find_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        self.read_account(id)
    }

    async fn list_accounts(&self, offset: usize, limit: usize) -> StoreResult<Vec<Account>> {
        // Keys are the raw id bytes, so iteration order is id order.
        let handle = cf(&self.db, CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self
            .db
            .iterator_cf(handle, IteratorMode::Start)
            .skip(offset)
            .take(limit)
        {
            let (_key, value) = item?;
            accounts.push(serde_json::from_slice(&value)?);
        }
        Ok(accounts)
    }

    async fn count_accounts(&self) -> StoreResult<usize> {
        let handle = cf(&self.db, CF_ACCOUNTS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(handle, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn list_payments(&self, offset: usize, limit: usize) -> StoreResult<Vec<PaymentEntry>> {
        let handle = cf(&self.db, CF_PAYMENTS)?;
        let mut payments = Vec::new();
        for item in self
            .db
            .iterator_cf(handle, IteratorMode::Start)
            .skip(offset)
            .take(limit)
        {
            let (_key, value) = item?;
            payments.push(serde_json::from_slice(&value)?);
        }
        Ok(payments)
    }

    async fn count_payments(&self) -> StoreResult<usize> {
        Ok(*self.next_seq.lock().await as usize)
    }
}

/// One open atomic unit against a [`RocksDBBackend`].
pub struct RocksDBUnit {
    backend: RocksDBBackend,
    held: LockSet,
    staged: Staged,
}

#[async_trait]
impl AccountStore for RocksDBUnit {
    async fn get_for_update(&mut self, id: &AccountId) -> StoreResult<Option<Account>> {
        if self.backend.read_account(id)?.is_none() {
            return Ok(None);
        }
        self.held.hold(&self.backend.locks, id).await;
        Ok(self.staged.view(self.backend.read_account(id)?))
    }

    async fn get(&mut self, id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.staged.view(self.backend.read_account(id)?))
    }

    async fn adjust_balance(&mut self, id: &AccountId, delta: Balance) -> StoreResult<()> {
        if self.backend.read_account(id)?.is_none() {
            return Err(StoreError::Constraint(format!("account {id} does not exist")));
        }
        self.staged.adjust(id, delta);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for RocksDBUnit {
    async fn append(&mut self, entry: PaymentEntry) -> StoreResult<()> {
        self.staged.append(entry);
        Ok(())
    }
}

#[async_trait]
impl AtomicUnit for RocksDBUnit {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let RocksDBUnit {
            backend,
            held,
            staged,
        } = *self;
        let db = &backend.db;
        let mut next_seq = backend.next_seq.lock().await;

        let settled = staged.settle(|id| read_account(db, id))?;
        let mut batch = WriteBatch::default();
        let accounts = cf(db, CF_ACCOUNTS)?;
        for account in &settled {
            batch.put_cf(accounts, account.id.as_str().as_bytes(), serde_json::to_vec(account)?);
        }
        let payments = cf(db, CF_PAYMENTS)?;
        let mut seq = *next_seq;
        for entry in staged.into_entries() {
            batch.put_cf(payments, seq.to_be_bytes(), serde_json::to_vec(&entry)?);
            seq += 1;
        }
        db.write(batch)?;
        *next_seq = seq;

        debug!(locks = held.len(), next_seq = seq, "unit committed");
        drop(held);
        Ok(())
    }
}
