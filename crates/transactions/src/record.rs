//! The transaction's own persistent record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::TransactionId;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a transaction.
///
/// A transaction starts `Pending` and becomes `Done` only after every one of
/// its transactors has completed successfully. A failed commit leaves the
/// status at `Pending` so the caller can tell the operation did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Done,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Done => write!(f, "done"),
        }
    }
}

/// A transaction's own fields and lifecycle state.
///
/// The fields are caller-supplied and schema-defined per transaction kind;
/// this type treats them as an opaque attribute map, the same way the store
/// treats item attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier, generated at construction time.
    pub id: TransactionId,

    /// The transaction kind (e.g. "energy_purchase").
    pub kind: String,

    /// Caller-supplied key/value fields.
    pub fields: HashMap<String, serde_json::Value>,

    /// Lifecycle status, flipped to `Done` by a successful commit.
    pub status: Status,

    /// When the record was constructed.
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Creates a record with no caller-supplied fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::from_dict(kind, HashMap::new())
    }

    /// Builds a record from a field mapping.
    pub fn from_dict(
        kind: impl Into<String>,
        fields: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind: kind.into(),
            fields,
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }

    /// Returns a caller-supplied field, if present.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Sets a caller-supplied field.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Flattens the record into a store attribute map for the ledger write.
    pub fn to_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut out = self.fields.clone();
        out.insert("id".to_string(), serde_json::json!(self.id.to_string()));
        out.insert("kind".to_string(), serde_json::json!(self.kind));
        out.insert(
            "status".to_string(),
            serde_json::json!(self.status.to_string()),
        );
        out.insert(
            "created_at".to_string(),
            serde_json::json!(self.created_at.to_rfc3339()),
        );
        out
    }
}
