//! The transaction abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{Status, TransactionRecord};
use crate::transactor::Transactor;

/// An atomic-looking, multi-step business update.
///
/// A transaction owns a persistent record and resolves into an ordered list
/// of transactors. `transactors` is the one extension point for deciding
/// what work the transaction does; a single-target transaction simply
/// returns a one-element list. Resolution is pure: it must not touch the
/// store, and every call must yield transactors usable for a fresh run.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// The transaction's own persistent record.
    fn record(&self) -> &TransactionRecord;

    /// Mutable access to the record, used by the engine to flip the status.
    fn record_mut(&mut self) -> &mut TransactionRecord;

    /// Transient transactions are never written to the ledger, regardless
    /// of outcome. Their side effects on targets still apply.
    fn transient(&self) -> bool {
        false
    }

    /// Precondition hook run before any transactor is attempted.
    ///
    /// If it fails, the transaction is still recorded in the ledger (unless
    /// transient) and the error propagates to the caller.
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Ordered units of work, evaluated left-to-right.
    fn transactors(&self) -> Vec<Arc<dyn Transactor>>;

    /// Current lifecycle status.
    fn status(&self) -> Status {
        self.record().status
    }
}

/// Ready-made transaction composed from a record and a list of steps.
///
/// For callers that don't need a custom transaction type: build it from a
/// field mapping, push transactors in execution order, and hand it to
/// [`TransactionEngine::commit`](crate::TransactionEngine::commit).
pub struct SimpleTransaction {
    record: TransactionRecord,
    transient: bool,
    steps: Vec<Arc<dyn Transactor>>,
}

impl SimpleTransaction {
    /// Creates a transaction with no caller-supplied fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::from_dict(kind, HashMap::new())
    }

    /// Builds a transaction from a field mapping.
    pub fn from_dict(
        kind: impl Into<String>,
        fields: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            record: TransactionRecord::from_dict(kind, fields),
            transient: false,
            steps: Vec::new(),
        }
    }

    /// Marks the transaction transient: its record is never persisted,
    /// only its side effects on targets.
    pub fn mark_transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Appends a unit of work. Steps run in the order they were pushed.
    pub fn with_step(mut self, step: Arc<dyn Transactor>) -> Self {
        self.steps.push(step);
        self
    }
}

#[async_trait]
impl Transaction for SimpleTransaction {
    fn record(&self) -> &TransactionRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut TransactionRecord {
        &mut self.record
    }

    fn transient(&self) -> bool {
        self.transient
    }

    fn transactors(&self) -> Vec<Arc<dyn Transactor>> {
        self.steps.clone()
    }
}
