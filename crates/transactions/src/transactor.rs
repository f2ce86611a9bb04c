//! The transactor: one (fetch, mutate, save) unit of work.

use async_trait::async_trait;
use item_store::{ItemKey, ItemStore, StoreError, StoredItem, Version};

use crate::error::BoxedError;

/// Business mutation applied to a freshly fetched target.
///
/// The mutator reads the target's current field values and rewrites them in
/// place, so it can be re-run safely against a refetched copy after a
/// conflicting save. Any error it returns is a business rejection and aborts
/// the transaction.
pub type Mutator = Box<dyn Fn(&mut StoredItem) -> Result<(), BoxedError> + Send + Sync>;

/// One unit of work inside a transaction.
///
/// A transactor pairs a getter for one target item with a business mutation
/// on it. The retry executor drives the three methods in lock-step: fetch,
/// mutate, save - and starts over from fetch when the save reports a
/// version conflict. Implementations must be stateless across attempts;
/// every attempt works on the copy returned by `fetch`.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Fetches a fresh copy of the target.
    async fn fetch(&self) -> Result<StoredItem, StoreError>;

    /// Applies the business mutation to a freshly fetched target.
    fn mutate(&self, target: &mut StoredItem) -> Result<(), BoxedError>;

    /// Conditionally persists the mutated target.
    async fn save(&self, target: &StoredItem) -> Result<Version, StoreError>;
}

/// Standard transactor backed by an [`ItemStore`].
///
/// Fetches the item at `key`, applies the mutator, and saves conditionally
/// on the version read at fetch time. A transaction that touches a single
/// target is just a one-element list of this.
pub struct StoreTransactor<S: ItemStore> {
    store: S,
    key: ItemKey,
    mutator: Mutator,
}

impl<S: ItemStore> StoreTransactor<S> {
    /// Creates a transactor for the item at `key`.
    pub fn new(
        store: S,
        key: ItemKey,
        mutator: impl Fn(&mut StoredItem) -> Result<(), BoxedError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            key,
            mutator: Box::new(mutator),
        }
    }

    /// Returns the key of the target this transactor works on.
    pub fn key(&self) -> &ItemKey {
        &self.key
    }
}

#[async_trait]
impl<S: ItemStore> Transactor for StoreTransactor<S> {
    async fn fetch(&self) -> Result<StoredItem, StoreError> {
        self.store.get(&self.key).await
    }

    fn mutate(&self, target: &mut StoredItem) -> Result<(), BoxedError> {
        (self.mutator)(target)
    }

    async fn save(&self, target: &StoredItem) -> Result<Version, StoreError> {
        self.store.save(target).await
    }
}
