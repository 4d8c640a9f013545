//! Fuzz target for transaction submission validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use minechain_node::validation::validate_transaction;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(tx) = validate_transaction(&raw, 0) {
        assert!(!tx.author.trim().is_empty());
        assert!(!tx.content.trim().is_empty());
        assert_eq!(tx.timestamp, 0);
    }
});
