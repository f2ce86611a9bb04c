use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    ItemKey, Result, StoreError, StoredItem, Version,
    store::ItemStore,
};

type Attributes = HashMap<String, serde_json::Value>;

/// In-memory item store implementation for testing.
///
/// Behaves like the networked store: every successful write advances the
/// item's version, and a save whose carried version no longer matches the
/// stored one fails with `ExpectedValue`.
#[derive(Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<ItemKey, (Version, Attributes)>>>,
}

impl InMemoryItemStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of items stored.
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Clears all items.
    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Unconditional write that bumps the item's version.
    ///
    /// This is the "other writer" in tests: touching an item between a
    /// `get` and a `save` makes the save fail with `ExpectedValue`.
    pub async fn force_put(&self, key: &ItemKey, attributes: Attributes) -> Version {
        let mut items = self.items.write().await;
        let version = items
            .get(key)
            .map(|(v, _)| v.next())
            .unwrap_or(Version::first());
        items.insert(key.clone(), (version, attributes));
        version
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, key: &ItemKey) -> Result<StoredItem> {
        let items = self.items.read().await;
        let (version, attributes) = items
            .get(key)
            .ok_or_else(|| StoreError::ItemNotFound(key.clone()))?;

        Ok(StoredItem {
            key: key.clone(),
            attributes: attributes.clone(),
            version: *version,
        })
    }

    async fn save(&self, item: &StoredItem) -> Result<Version> {
        let mut items = self.items.write().await;

        let actual = items
            .get(&item.key)
            .map(|(v, _)| *v)
            .unwrap_or(Version::initial());

        if actual != item.version {
            tracing::debug!(key = %item.key, expected = %item.version, %actual, "conditional write failed");
            return Err(StoreError::ExpectedValue {
                key: item.key.clone(),
                expected: item.version,
                actual,
            });
        }

        let new_version = actual.next();
        items.insert(item.key.clone(), (new_version, item.attributes.clone()));
        Ok(new_version)
    }

    async fn create(
        &self,
        key: &ItemKey,
        attributes: HashMap<String, serde_json::Value>,
    ) -> Result<Version> {
        let mut items = self.items.write().await;

        if items.contains_key(key) {
            return Err(StoreError::Overwrite(key.clone()));
        }

        items.insert(key.clone(), (Version::first(), attributes));
        Ok(Version::first())
    }

    async fn delete(&self, key: &ItemKey) -> Result<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> ItemKey {
        ItemKey::new("test", id)
    }

    #[tokio::test]
    async fn get_missing_item_returns_not_found() {
        let store = InMemoryItemStore::new();
        let result = store.get(&key("nope")).await;
        assert!(matches!(result, Err(StoreError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn save_new_item_then_get() {
        let store = InMemoryItemStore::new();
        let mut seeded = HashMap::new();
        seeded.insert("energy".to_string(), serde_json::json!(10));
        let item = StoredItem::with_attributes(key("a"), seeded);

        let version = store.save(&item).await.unwrap();
        assert_eq!(version, Version::first());

        let loaded = store.get(&key("a")).await.unwrap();
        assert_eq!(loaded.get_i64("energy"), Some(10));
        assert_eq!(loaded.version, Version::first());
    }

    #[tokio::test]
    async fn save_advances_version() {
        let store = InMemoryItemStore::new();
        let item = StoredItem::new(key("a"));
        store.save(&item).await.unwrap();

        let mut loaded = store.get(&key("a")).await.unwrap();
        loaded.set_attribute("energy", 5);
        let version = store.save(&loaded).await.unwrap();
        assert_eq!(version, Version::new(2));
    }

    #[tokio::test]
    async fn stale_save_fails_with_expected_value() {
        let store = InMemoryItemStore::new();
        store.force_put(&key("a"), HashMap::new()).await;

        let loaded = store.get(&key("a")).await.unwrap();

        // Another writer touches the item after our read.
        store.force_put(&key("a"), HashMap::new()).await;

        let result = store.save(&loaded).await;
        assert!(matches!(result, Err(StoreError::ExpectedValue { .. })));
    }

    #[tokio::test]
    async fn stale_save_leaves_item_untouched() {
        let store = InMemoryItemStore::new();
        let mut seeded = HashMap::new();
        seeded.insert("energy".to_string(), serde_json::json!(10));
        store.force_put(&key("a"), seeded).await;

        let mut loaded = store.get(&key("a")).await.unwrap();
        loaded.set_attribute("energy", 0);

        let mut concurrent = HashMap::new();
        concurrent.insert("energy".to_string(), serde_json::json!(7));
        store.force_put(&key("a"), concurrent).await;

        assert!(store.save(&loaded).await.is_err());

        let current = store.get(&key("a")).await.unwrap();
        assert_eq!(current.get_i64("energy"), Some(7));
    }

    #[tokio::test]
    async fn create_existing_item_returns_overwrite() {
        let store = InMemoryItemStore::new();
        store.create(&key("a"), HashMap::new()).await.unwrap();

        let result = store.create(&key("a"), HashMap::new()).await;
        assert!(matches!(result, Err(StoreError::Overwrite(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryItemStore::new();
        store.create(&key("a"), HashMap::new()).await.unwrap();

        store.delete(&key("a")).await.unwrap();
        store.delete(&key("a")).await.unwrap();
        assert_eq!(store.item_count().await, 0);
    }

    #[tokio::test]
    async fn force_put_bumps_version() {
        let store = InMemoryItemStore::new();
        let v1 = store.force_put(&key("a"), HashMap::new()).await;
        let v2 = store.force_put(&key("a"), HashMap::new()).await;
        assert_eq!(v1, Version::first());
        assert_eq!(v2, Version::new(2));
    }
}
