//! Minechain Consensus Engine
//!
//! This crate provides the ledger core of a Minechain node: an append-only,
//! tamper-evident chain of proof-of-work blocks, replicated across nodes that
//! reconcile by adopting the longest valid chain.
//!
//! # Components
//!
//! - [`Block`]: a sealed [`BlockPayload`] plus nonce and hash
//! - [`ProofOfWork`]: leading-zero nonce search
//! - [`Validator`]: proof and hash-chain linkage checks
//! - [`Mempool`]: pending transaction pool
//! - [`Ledger`]: the accepted chain plus mempool, with `append` and `mine`
//! - [`ChainEngine`]: the ledger behind the node's locking discipline
//! - [`ConsensusResolver`]: chain reconstruction and the longest-valid-chain rule
//! - [`ChainDump`]: the wire form exchanged between nodes
//!
//! # Transaction Flow
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Client     │────▶│  Boundary    │────▶│   Mempool    │
//! │ (submit tx)  │     │ (fields ok?) │     │  (pending)   │
//! └──────────────┘     └──────────────┘     └──────┬───────┘
//!                                                   │ mine()
//!                      ┌────────────────────────────┘
//!                      ▼
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Broadcast   │◀────│   append     │◀────│ ProofOfWork  │
//! │  to Peers    │     │ (validated)  │     │    seal      │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use minechain_consensus::{ChainParams, Ledger, Transaction};
//!
//! let mut ledger = Ledger::new(&ChainParams::default());
//! ledger.add_transaction(Transaction::new("A", "hi"));
//!
//! let block = ledger.mine().unwrap().expect("mempool was not empty");
//! assert_eq!(block.index(), 1);
//! assert!(block.hash().as_str().starts_with("00"));
//! assert!(ledger.validator().is_valid_chain(ledger.chain()));
//! ```

mod block;
mod dump;
mod engine;
mod error;
mod genesis;
mod ledger;
mod mempool;
mod pow;
mod resolver;
mod transaction;
mod validator;

pub use block::{Block, BlockHash, BlockPayload, EncodedPayload};
pub use dump::ChainDump;
pub use engine::ChainEngine;
pub use error::{ConsensusError, Result};
pub use genesis::{ChainParams, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
pub use ledger::{Candidate, Ledger};
pub use mempool::{Mempool, MempoolSnapshot, TxSeq};
pub use pow::{ProofOfWork, Seal};
pub use resolver::{ConsensusResolver, Resolution};
pub use transaction::{now_millis, Transaction};
pub use validator::Validator;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_block_chain() -> Vec<Block> {
        let mut ledger = Ledger::new(&ChainParams::default());
        ledger.add_transaction(Transaction::with_timestamp("A", "one", 1));
        ledger.add_transaction(Transaction::with_timestamp("B", "two", 2));
        ledger.mine().unwrap();
        ledger.add_transaction(Transaction::with_timestamp("C", "three", 3));
        ledger.mine().unwrap();
        ledger.into_chain()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut ledger = Ledger::new(&ChainParams::default());
        let genesis = ledger.last_block().clone();
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.prev_hash().as_str(), "0");

        ledger.add_transaction(Transaction::new("A", "hi"));
        let block1 = ledger.mine().unwrap().unwrap();

        assert_eq!(block1.index(), 1);
        assert_eq!(block1.prev_hash(), genesis.hash());
        assert!(block1.hash().leading_zeros() >= DEFAULT_DIFFICULTY);
        assert!(Validator::new(DEFAULT_DIFFICULTY).is_valid_chain(&[genesis, block1]));
    }

    proptest! {
        #[test]
        fn prop_compute_hash_is_pure(
            index in 0u64..1_000,
            timestamp in any::<u64>(),
            nonce in any::<u64>(),
            author in "[a-z]{1,8}",
            content in ".{0,32}",
        ) {
            let payload = BlockPayload::new(
                index,
                vec![Transaction::with_timestamp(author, content, timestamp)],
                timestamp,
                BlockHash::from("prev"),
            );
            prop_assert_eq!(payload.compute_hash(nonce), payload.compute_hash(nonce));
            prop_assert_eq!(payload.compute_hash(nonce), payload.encode().hash_with(nonce));
        }

        #[test]
        fn prop_any_single_field_tamper_is_detected(
            position in 1usize..3,
            field in 0u8..3,
            salt in 1u64..1_000,
        ) {
            let mut chain = two_block_chain();
            let validator = Validator::new(DEFAULT_DIFFICULTY);
            prop_assert!(validator.is_valid_chain(&chain));

            let (mut payload, mut nonce, hash) = chain[position].clone().into_parts();
            match field {
                0 => payload.transactions[0].content.push_str(&salt.to_string()),
                1 => payload.prev_hash = BlockHash::from(format!("00{salt:062x}")),
                _ => nonce = nonce.wrapping_add(salt),
            }
            chain[position] = Block::from_parts(payload, nonce, hash);

            prop_assert!(!validator.is_valid_chain(&chain));
        }
    }
}
