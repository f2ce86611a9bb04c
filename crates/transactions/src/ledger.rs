//! Append-only ledger of transaction records.

use std::sync::Arc;

use async_trait::async_trait;
use item_store::{ItemKey, ItemStore};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::record::TransactionRecord;

/// Durable record of a transaction's own fields and final status.
///
/// Written exactly once per commit, after the commit concludes; transient
/// transactions are never written.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Appends a transaction record.
    async fn append(&self, record: &TransactionRecord) -> Result<()>;
}

/// Ledger that persists records into the item store, one item per
/// transaction, keyed by the transaction ID.
///
/// Records are written with an insert-only write, so an existing entry can
/// never be silently overwritten.
pub struct StoreLedger<S: ItemStore> {
    store: S,
    table: String,
}

impl<S: ItemStore> StoreLedger<S> {
    /// Creates a ledger writing into the given table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl<S: ItemStore> Ledger for StoreLedger<S> {
    async fn append(&self, record: &TransactionRecord) -> Result<()> {
        let key = ItemKey::new(self.table.as_str(), record.id.to_string());
        self.store.create(&key, record.to_attributes()).await?;
        tracing::debug!(%key, status = %record.status, "ledger entry written");
        Ok(())
    }
}

/// In-memory ledger for testing.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    entries: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records written.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns a copy of all records, in write order.
    pub async fn entries(&self) -> Vec<TransactionRecord> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn append(&self, record: &TransactionRecord) -> Result<()> {
        self.entries.write().await.push(record.clone());
        Ok(())
    }
}
