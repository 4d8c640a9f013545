//! Fuzz target for canonical block hashing.
//!
//! The split prefix/suffix encoding used by the nonce search must always
//! agree with hashing the whole payload.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use minechain_consensus::{BlockHash, BlockPayload, Transaction};

#[derive(Debug, Arbitrary)]
struct Input {
    index: u64,
    timestamp: u64,
    prev_hash: String,
    nonce: u64,
    transactions: Vec<(String, String, u64)>,
}

fuzz_target!(|input: Input| {
    let transactions = input
        .transactions
        .into_iter()
        .map(|(author, content, ts)| Transaction::with_timestamp(author, content, ts))
        .collect();

    let payload = BlockPayload::new(
        input.index,
        transactions,
        input.timestamp,
        BlockHash::from(input.prev_hash),
    );

    assert_eq!(
        payload.compute_hash(input.nonce),
        payload.encode().hash_with(input.nonce)
    );
});
