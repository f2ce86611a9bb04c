//! Commit orchestration.

use crate::error::{Result, TransactionError};
use crate::ledger::Ledger;
use crate::record::Status;
use crate::retry::{self, RetryPolicy};
use crate::transaction::Transaction;

/// Drives transactions through their lifecycle.
///
/// The engine is responsible for:
/// 1. Running the transaction's setup hook
/// 2. Driving each transactor through bounded optimistic retries, in order
/// 3. Flipping the status to `Done` once every transactor has saved
/// 4. Writing the transaction record to the ledger
///
/// Transactors that saved before a later one failed are not undone; the
/// store has no multi-item transactions, so the caller observes the error
/// with the status still `Pending` and the earlier saves applied.
pub struct TransactionEngine<L: Ledger> {
    ledger: L,
    policy: RetryPolicy,
}

impl<L: Ledger> TransactionEngine<L> {
    /// Creates an engine with the default retry policy.
    pub fn new(ledger: L) -> Self {
        Self::with_policy(ledger, RetryPolicy::default())
    }

    /// Creates an engine with an explicit retry policy.
    pub fn with_policy(ledger: L, policy: RetryPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Returns the engine's retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns a reference to the underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Commits a transaction.
    ///
    /// On success the status is `Done` and the record is in the ledger. On
    /// failure the status stays `Pending` and the error surfaces unmodified;
    /// the ledger still records the attempt when setup failed or a
    /// transactor exhausted its retries.
    #[tracing::instrument(
        skip_all,
        fields(transaction_id = %txn.record().id, kind = %txn.record().kind)
    )]
    pub async fn commit<T>(&self, txn: &mut T) -> Result<()>
    where
        T: Transaction + ?Sized,
    {
        metrics::counter!("transaction_commits_total").increment(1);
        let start = std::time::Instant::now();

        if let Err(e) = txn.setup().await {
            tracing::warn!(error = %e, "setup failed");
            metrics::counter!("transaction_failed").increment(1);
            // A failed setup is still recorded; the status stays pending.
            self.write_ledger(txn).await?;
            return Err(e);
        }

        for transactor in txn.transactors() {
            match retry::drive(transactor.as_ref(), &self.policy).await {
                Ok(_) => {}
                Err(e @ TransactionError::MaxRetriesExceeded { .. }) => {
                    tracing::warn!(error = %e, "transactor exhausted its retries");
                    metrics::counter!("transaction_failed").increment(1);
                    self.write_ledger(txn).await?;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "transactor failed");
                    metrics::counter!("transaction_failed").increment(1);
                    return Err(e);
                }
            }
        }

        txn.record_mut().status = Status::Done;
        self.write_ledger(txn).await?;

        metrics::histogram!("transaction_commit_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        metrics::counter!("transaction_committed").increment(1);
        tracing::info!("transaction committed");

        Ok(())
    }

    async fn write_ledger<T>(&self, txn: &T) -> Result<()>
    where
        T: Transaction + ?Sized,
    {
        if txn.transient() {
            return Ok(());
        }
        self.ledger.append(txn.record()).await
    }
}
