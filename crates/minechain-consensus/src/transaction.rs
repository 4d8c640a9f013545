//! Ledger transaction records.
//!
//! A transaction is an opaque key/value payload. Only `author` and `content`
//! are required; anything else the submitter sends is carried along verbatim
//! and becomes part of the hashed block payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// A transaction admitted to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Who submitted the transaction.
    pub author: String,

    /// Free-form transaction body.
    pub content: String,

    /// Admission time (unix milliseconds), stamped by the receiving node.
    pub timestamp: u64,

    /// Additional submitter-supplied attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Transaction {
    /// Creates a transaction stamped with the current time.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_timestamp(author, content, now_millis())
    }

    /// Creates a transaction with an explicit admission timestamp.
    pub fn with_timestamp(
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp,
            extra: BTreeMap::new(),
        }
    }

    /// Attaches an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
