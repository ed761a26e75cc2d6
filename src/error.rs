use crate::domain::account::Currency;
use thiserror::Error;

/// Failures raised by a storage backend.
///
/// These are surfaced to clients opaquely; see [`TransferError::client_message`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Account {0} already exists")]
    DuplicateAccount(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Every way a single transfer attempt can fail.
///
/// All variants are terminal for the attempt. Validation variants are detected before
/// anything is staged; `Timeout` and `Store` abort whatever the unit had staged.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("source account and destination account are the same")]
    SameAccount,
    #[error("payment amount must be greater than 0")]
    InvalidAmount,
    #[error("source account not found")]
    SourceNotFound,
    #[error("destination account not found")]
    DestinationNotFound,
    #[error("source account has {from} currency, but destination account has {to} currency")]
    CurrencyMismatch { from: Currency, to: Currency },
    #[error("account doesn't have enough money to send the payment")]
    InsufficientFunds,
    #[error("transfer deadline exceeded")]
    Timeout,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TransferError {
    /// Stable code a transport maps onto its wire-level status.
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::SameAccount => "PAYMENT_TO_SAME_ACCOUNT",
            TransferError::InvalidAmount => "NOT_POSITIVE_PAYMENT_AMOUNT",
            TransferError::SourceNotFound => "FROM_ACCOUNT_NOT_FOUND",
            TransferError::DestinationNotFound => "TO_ACCOUNT_NOT_FOUND",
            TransferError::CurrencyMismatch { .. } => "DIFFERENT_CURRENCIES",
            TransferError::InsufficientFunds => "LOW_BALANCE",
            TransferError::Timeout => "TIMEOUT",
            TransferError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a client. Store failures never leak their detail.
    pub fn client_message(&self) -> String {
        match self {
            TransferError::Store(_) => "Internal error.".to_string(),
            other => {
                let text = other.to_string();
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
                    None => text,
                }
            }
        }
    }

    /// True for failures detected before any mutation was staged.
    pub fn is_validation(&self) -> bool {
        !matches!(self, TransferError::Timeout | TransferError::Store(_))
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
