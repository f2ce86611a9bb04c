use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Version number for a stored item, used for optimistic concurrency control.
///
/// Versions start at 1 for the first write and increment by 1 for each
/// subsequent write to an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for an item that does not exist yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first write.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Table-qualified key identifying a single item in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// The table (or namespace) the item lives in.
    pub table: String,

    /// The item's primary key within the table.
    pub id: String,
}

impl ItemKey {
    /// Creates a new item key.
    pub fn new(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.table, self.id)
    }
}

/// A stored item together with the version it was read at.
///
/// The carried version is what a subsequent [`save`](crate::ItemStore::save)
/// conditions on: if another writer advanced the item in the meantime, the
/// save fails with [`StoreError::ExpectedValue`](crate::StoreError::ExpectedValue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    /// The item's key.
    pub key: ItemKey,

    /// Free-form attribute map. The store is schema-less; any JSON value
    /// can be stored under any attribute name.
    pub attributes: HashMap<String, serde_json::Value>,

    /// The version observed when the item was read.
    pub version: Version,
}

impl StoredItem {
    /// Creates a new, not-yet-persisted item with no attributes.
    pub fn new(key: ItemKey) -> Self {
        Self {
            key,
            attributes: HashMap::new(),
            version: Version::initial(),
        }
    }

    /// Creates a new item with the given attributes.
    pub fn with_attributes(key: ItemKey, attributes: HashMap<String, serde_json::Value>) -> Self {
        Self {
            key,
            attributes,
            version: Version::initial(),
        }
    }

    /// Returns the attribute with the given name, if present.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the attribute as an integer, if present and numeric.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(|v| v.as_i64())
    }

    /// Returns the attribute as a string slice, if present and textual.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }
}
