//! Bounded optimistic-retry execution of a single transactor.

use std::time::Duration;

use item_store::{StoreError, Version};

use crate::error::TransactionError;
use crate::transactor::Transactor;

/// Default bound on conflicting save attempts per transactor.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Retry configuration for conflicting saves.
///
/// `max_retries` bounds the total number of save attempts per transactor.
/// `backoff` is an optional fixed delay between attempts; correctness does
/// not depend on it, it only reduces contention on hot items.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Option<Duration>,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt bound and no backoff.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: None,
        }
    }

    /// Adds a fixed delay between conflicting attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = Some(backoff);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

/// Drives one transactor to a successful save under optimistic concurrency.
///
/// Each attempt refetches the target and re-derives the mutation from the
/// fresh state; a mutation is never replayed against a stale copy. Only the
/// store's version conflict is retried - a missing target or a business
/// rejection aborts on the first attempt.
#[tracing::instrument(skip_all)]
pub(crate) async fn drive(
    transactor: &dyn Transactor,
    policy: &RetryPolicy,
) -> Result<Version, TransactionError> {
    let mut attempts: u32 = 0;

    loop {
        let mut target = match transactor.fetch().await {
            Ok(target) => target,
            Err(StoreError::ItemNotFound(key)) => {
                return Err(TransactionError::TargetNotFound(key));
            }
            Err(e) => return Err(e.into()),
        };

        transactor.mutate(&mut target).map_err(TransactionError::Rejected)?;

        match transactor.save(&target).await {
            Ok(version) => {
                if attempts > 0 {
                    tracing::debug!(key = %target.key, attempts, "save succeeded after conflicts");
                }
                return Ok(version);
            }
            Err(StoreError::ExpectedValue { key, .. }) => {
                attempts += 1;
                metrics::counter!("transaction_save_conflicts_total").increment(1);
                tracing::debug!(%key, attempts, "conflicting save, refetching target");

                if attempts >= policy.max_retries {
                    return Err(TransactionError::MaxRetriesExceeded { key, attempts });
                }
                if let Some(delay) = policy.backoff {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use item_store::{ItemKey, StoredItem};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted transactor whose save conflicts a fixed number of times.
    struct ScriptedTransactor {
        key: ItemKey,
        conflicts: AtomicU32,
        fetch_calls: AtomicU32,
        mutate_calls: AtomicU32,
        save_calls: AtomicU32,
    }

    impl ScriptedTransactor {
        fn conflicting(conflicts: u32) -> Self {
            Self {
                key: ItemKey::new("test", "t-1"),
                conflicts: AtomicU32::new(conflicts),
                fetch_calls: AtomicU32::new(0),
                mutate_calls: AtomicU32::new(0),
                save_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transactor for ScriptedTransactor {
        async fn fetch(&self) -> Result<StoredItem, StoreError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(StoredItem::new(self.key.clone()))
        }

        fn mutate(&self, _target: &mut StoredItem) -> Result<(), crate::BoxedError> {
            self.mutate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn save(&self, target: &StoredItem) -> Result<Version, StoreError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::ExpectedValue {
                    key: target.key.clone(),
                    expected: target.version,
                    actual: target.version.next(),
                });
            }
            Ok(target.version.next())
        }
    }

    #[tokio::test]
    async fn clean_save_takes_one_attempt() {
        let transactor = ScriptedTransactor::conflicting(0);
        drive(&transactor, &RetryPolicy::default()).await.unwrap();

        assert_eq!(transactor.fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transactor.mutate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transactor.save_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn conflicts_trigger_refetch_in_lockstep() {
        let transactor = ScriptedTransactor::conflicting(3);
        drive(&transactor, &RetryPolicy::default()).await.unwrap();

        // Three conflicts plus the success: four attempts, each a full
        // fetch/mutate/save round.
        assert_eq!(transactor.fetch_calls.load(Ordering::SeqCst), 4);
        assert_eq!(transactor.mutate_calls.load(Ordering::SeqCst), 4);
        assert_eq!(transactor.save_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn exhaustion_counts_exactly_max_retries_saves() {
        let transactor = ScriptedTransactor::conflicting(u32::MAX);
        let policy = RetryPolicy::new(5);

        let result = drive(&transactor, &policy).await;
        assert!(matches!(
            result,
            Err(TransactionError::MaxRetriesExceeded { attempts: 5, .. })
        ));
        assert_eq!(transactor.save_calls.load(Ordering::SeqCst), 5);
    }

    struct NotFoundTransactor;

    #[async_trait]
    impl Transactor for NotFoundTransactor {
        async fn fetch(&self) -> Result<StoredItem, StoreError> {
            Err(StoreError::ItemNotFound(ItemKey::new("test", "ghost")))
        }

        fn mutate(&self, _target: &mut StoredItem) -> Result<(), crate::BoxedError> {
            panic!("mutate must not be called when fetch fails");
        }

        async fn save(&self, _target: &StoredItem) -> Result<Version, StoreError> {
            panic!("save must not be called when fetch fails");
        }
    }

    #[tokio::test]
    async fn missing_target_is_not_retried() {
        let result = drive(&NotFoundTransactor, &RetryPolicy::default()).await;
        assert!(matches!(result, Err(TransactionError::TargetNotFound(_))));
    }

    struct RejectingTransactor {
        save_calls: AtomicU32,
    }

    #[async_trait]
    impl Transactor for RejectingTransactor {
        async fn fetch(&self) -> Result<StoredItem, StoreError> {
            Ok(StoredItem::new(ItemKey::new("test", "t-1")))
        }

        fn mutate(&self, _target: &mut StoredItem) -> Result<(), crate::BoxedError> {
            Err("insufficient energy".into())
        }

        async fn save(&self, target: &StoredItem) -> Result<Version, StoreError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            Ok(target.version.next())
        }
    }

    #[tokio::test]
    async fn business_rejection_aborts_before_save() {
        let transactor = RejectingTransactor {
            save_calls: AtomicU32::new(0),
        };

        let result = drive(&transactor, &RetryPolicy::default()).await;
        assert!(matches!(result, Err(TransactionError::Rejected(_))));
        assert_eq!(transactor.save_calls.load(Ordering::SeqCst), 0);
    }
}
