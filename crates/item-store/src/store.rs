use std::collections::HashMap;

use async_trait::async_trait;

use crate::{ItemKey, Result, StoredItem, Version};

/// Core trait for item store implementations.
///
/// The store offers single-item conditional writes only; there is no
/// multi-item transaction primitive. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Retrieves a single item by key.
    ///
    /// The returned item carries the version it was read at, which a
    /// subsequent [`save`](ItemStore::save) conditions on.
    /// Fails with `ItemNotFound` if the key is absent.
    async fn get(&self, key: &ItemKey) -> Result<StoredItem>;

    /// Conditionally persists a mutated item.
    ///
    /// The write succeeds only if the stored version still equals
    /// `item.version`; otherwise it fails with `ExpectedValue` and nothing
    /// is written. An item carrying the initial version is inserted.
    ///
    /// Returns the item's new version.
    async fn save(&self, item: &StoredItem) -> Result<Version>;

    /// Insert-only write.
    ///
    /// Fails with `Overwrite` if the key already exists.
    async fn create(
        &self,
        key: &ItemKey,
        attributes: HashMap<String, serde_json::Value>,
    ) -> Result<Version>;

    /// Deletes an item. Deleting an absent key is a no-op.
    async fn delete(&self, key: &ItemKey) -> Result<()>;
}

#[async_trait]
impl<T: ItemStore + ?Sized> ItemStore for std::sync::Arc<T> {
    async fn get(&self, key: &ItemKey) -> Result<StoredItem> {
        (**self).get(key).await
    }

    async fn save(&self, item: &StoredItem) -> Result<Version> {
        (**self).save(item).await
    }

    async fn create(
        &self,
        key: &ItemKey,
        attributes: HashMap<String, serde_json::Value>,
    ) -> Result<Version> {
        (**self).create(key, attributes).await
    }

    async fn delete(&self, key: &ItemKey) -> Result<()> {
        (**self).delete(key).await
    }
}
