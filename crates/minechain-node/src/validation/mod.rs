//! # Input Validation Module
//!
//! Validation of client-submitted transactions before they reach the ledger.
//!
//! A submission is a JSON object that must carry non-empty string `author`
//! and `content` attributes. Any other attributes are kept. A `timestamp`
//! sent by the client is discarded and replaced by the admission time.
//!
//! ## Usage
//!
//! ```rust
//! use minechain_node::validation::validate_transaction;
//! use serde_json::json;
//!
//! let tx = validate_transaction(&json!({"author": "A", "content": "hi"}), 42).unwrap();
//! assert_eq!(tx.timestamp, 42);
//!
//! assert!(validate_transaction(&json!({"author": "A"}), 42).is_err());
//! ```

use minechain_consensus::{ConsensusError, Transaction};
use serde_json::{Map, Value};

/// Attributes every submission must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 2] = ["author", "content"];

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ConsensusError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => Err(ConsensusError::MissingField(field)),
    }
}

/// Validates a raw submission and stamps it with `admitted_at`.
///
/// Returns [`ConsensusError::MissingField`] naming the first required
/// attribute that is absent, null, empty, or not a string. A body that is not
/// an object is reported as missing `author`.
pub fn validate_transaction(raw: &Value, admitted_at: u64) -> Result<Transaction, ConsensusError> {
    let Some(object) = raw.as_object() else {
        return Err(ConsensusError::MissingField(REQUIRED_FIELDS[0]));
    };

    let author = required_str(object, "author")?;
    let content = required_str(object, "content")?;

    let mut transaction = Transaction::with_timestamp(author, content, admitted_at);
    for (key, value) in object {
        if !matches!(key.as_str(), "author" | "content" | "timestamp") {
            transaction.extra.insert(key.clone(), value.clone());
        }
    }

    Ok(transaction)
}
