//! Atomic multi-step business updates over a conditional-write item store.
//!
//! The store only offers single-item conditional writes, so a transaction is
//! decomposed into an ordered list of transactors: (fetch, mutate, save)
//! units that each touch one target item. Saves are optimistic: on a version
//! conflict the target is refetched and the mutation re-derived from the
//! fresh state, up to a bounded number of attempts. The transaction's own
//! record is written to an append-only ledger when the commit concludes.
//!
//! There is no cross-transactor rollback: a transactor that has saved stays
//! saved even if a later transactor fails. This is a property of the store
//! (no multi-item transactions), not of this crate.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod record;
pub mod retry;
pub mod transaction;
pub mod transactor;

pub use common::TransactionId;
pub use engine::TransactionEngine;
pub use error::{BoxedError, Result, TransactionError};
pub use ledger::{InMemoryLedger, Ledger, StoreLedger};
pub use record::{Status, TransactionRecord};
pub use retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
pub use transaction::{SimpleTransaction, Transaction};
pub use transactor::{Mutator, StoreTransactor, Transactor};
