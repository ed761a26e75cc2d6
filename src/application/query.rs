use crate::domain::account::Account;
use crate::domain::payment::PaymentEntry;
use crate::domain::ports::{BackendHandle, QueryStore};
use crate::error::StoreResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Offset/limit window over a listing. A zero limit means "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total: usize,
}

/// Read paths over accounts and the payment log.
#[derive(Clone)]
pub struct QueryService {
    backend: BackendHandle,
    default_limit: usize,
}

impl QueryService {
    pub fn new(backend: BackendHandle) -> Self {
        Self::with_default_limit(backend, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_default_limit(backend: BackendHandle, default_limit: usize) -> Self {
        Self {
            backend,
            default_limit: default_limit.max(1),
        }
    }

    fn limit(&self, page: PageRequest) -> usize {
        if page.limit == 0 {
            self.default_limit
        } else {
            page.limit
        }
    }

    /// Accounts ordered by id.
    pub async fn accounts(&self, page: PageRequest) -> StoreResult<Page<Account>> {
        let results = self
            .backend
            .list_accounts(page.offset, self.limit(page))
            .await?;
        let total = self.backend.count_accounts().await?;
        Ok(Page { results, total })
    }

    /// Payment entries in the order they were committed.
    pub async fn payments(&self, page: PageRequest) -> StoreResult<Page<PaymentEntry>> {
        let results = self
            .backend
            .list_payments(page.offset, self.limit(page))
            .await?;
        let total = self.backend.count_payments().await?;
        Ok(Page { results, total })
    }

    /// Every account, walking pages of the default size.
    pub async fn all_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut accounts = Vec::new();
        loop {
            let page = self
                .accounts(PageRequest::new(accounts.len(), self.default_limit))
                .await?;
            let fetched = page.results.len();
            accounts.extend(page.results);
            if fetched < self.default_limit {
                return Ok(accounts);
            }
        }
    }

    /// Every payment entry in commit order.
    pub async fn all_payments(&self) -> StoreResult<Vec<PaymentEntry>> {
        let mut payments = Vec::new();
        loop {
            let page = self
                .payments(PageRequest::new(payments.len(), self.default_limit))
                .await?;
            let fetched = page.results.len();
            payments.extend(page.results);
            if fetched < self.default_limit {
                return Ok(payments);
            }
        }
    }
}
