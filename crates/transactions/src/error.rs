//! Transaction error types.
//!
//! The retry boundary is an explicit decision encoded in this union: the
//! store's version conflict is the only recoverable outcome and never
//! appears here directly, only as `MaxRetriesExceeded` once exhausted.

use item_store::{ItemKey, StoreError};
use thiserror::Error;

/// Boxed error type for business rule rejections raised by mutators.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can abort a transaction commit.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A transactor's target does not exist. Fatal, never retried.
    #[error("Target not found: {0}")]
    TargetNotFound(ItemKey),

    /// A mutator rejected the mutation on business grounds
    /// (e.g. the update would drive a balance negative). Fatal, never retried.
    #[error("Business rule rejected the mutation: {0}")]
    Rejected(#[source] BoxedError),

    /// A transactor's save kept conflicting with concurrent writers until
    /// the retry budget was used up.
    #[error("Gave up on {key} after {attempts} conflicting saves")]
    MaxRetriesExceeded { key: ItemKey, attempts: u32 },

    /// A non-conflict store failure (missing ledger table, serialization of
    /// stored attributes, ...).
    #[error("Item store error: {0}")]
    Store(#[from] StoreError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransactionError {
    /// Wraps a business rule rejection.
    pub fn rejected(err: impl Into<BoxedError>) -> Self {
        Self::Rejected(err.into())
    }
}

/// Result type for transaction operations.
pub type Result<T> = std::result::Result<T, TransactionError>;
