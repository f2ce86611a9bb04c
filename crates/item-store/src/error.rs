use thiserror::Error;

use crate::{ItemKey, Version};

/// Errors that can occur when interacting with the item store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested item does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemKey),

    /// Conditional write failure.
    /// The version observed at read time no longer matches what is stored,
    /// i.e. another writer updated the item in between.
    #[error("Conditional write failed for {key}: expected version {expected}, found {actual}")]
    ExpectedValue {
        key: ItemKey,
        expected: Version,
        actual: Version,
    },

    /// An insert-only write would overwrite an existing item.
    #[error("Item already exists: {0}")]
    Overwrite(ItemKey),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for item store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
