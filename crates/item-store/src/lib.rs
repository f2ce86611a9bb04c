//! Schema-less item store with per-item optimistic concurrency.
//!
//! The store holds free-form attribute maps identified by a table-qualified
//! key. Writes are single-item conditional writes: a save succeeds only if
//! the stored version still matches the version observed at read time.

pub mod error;
pub mod item;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use item::{ItemKey, StoredItem, Version};
pub use memory::InMemoryItemStore;
pub use store::ItemStore;
