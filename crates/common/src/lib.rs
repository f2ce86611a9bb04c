//! Shared types used across the transaction engine crates.

pub mod types;

pub use types::TransactionId;
