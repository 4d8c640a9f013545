//! Block and chain validation.
//!
//! The validator is stateless apart from the difficulty: it re-derives every
//! hash from the payload and nonce and compares it with the claimed one.

use crate::block::{Block, BlockHash, BlockPayload};
use crate::error::{ConsensusError, Result};
use crate::pow::ProofOfWork;

/// Checks proofs and hash-chain linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    pow: ProofOfWork,
}

impl Validator {
    /// Creates a validator for the given difficulty.
    pub fn new(difficulty: usize) -> Self {
        Self {
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Returns the difficulty.
    pub fn difficulty(&self) -> usize {
        self.pow.difficulty()
    }

    /// True iff `claimed` meets the difficulty and equals the recomputed hash
    /// of `payload` with `nonce`.
    pub fn is_valid_proof(&self, payload: &BlockPayload, nonce: u64, claimed: &BlockHash) -> bool {
        self.pow.accepts(claimed) && *claimed == payload.compute_hash(nonce)
    }

    /// Checks a sealed block's own hash as its proof.
    pub fn is_valid_block(&self, block: &Block) -> bool {
        self.is_valid_proof(block.payload(), block.nonce(), block.hash())
    }

    /// Returns true if the whole sequence is a valid chain.
    ///
    /// The empty sequence is valid.
    pub fn is_valid_chain(&self, blocks: &[Block]) -> bool {
        self.check_chain(blocks).is_ok()
    }

    /// Walks the chain from the `"0"` sentinel and reports the first failure.
    ///
    /// Genesis (position 0) must carry index 0, link to the sentinel and hash
    /// correctly, but is exempt from the difficulty predicate.
    pub fn check_chain(&self, blocks: &[Block]) -> Result<()> {
        let mut prev_hash = BlockHash::genesis_parent();

        for (position, block) in blocks.iter().enumerate() {
            let expected_index = position as u64;
            if block.index() != expected_index {
                return Err(tampered(
                    position,
                    format!("index {} where {} expected", block.index(), expected_index),
                ));
            }

            if *block.prev_hash() != prev_hash {
                return Err(tampered(
                    position,
                    format!("prev_hash {} does not link to {}", block.prev_hash(), prev_hash),
                ));
            }

            let proof_ok = if position == 0 {
                *block.hash() == block.recompute_hash()
            } else {
                self.is_valid_block(block)
            };
            if !proof_ok {
                return Err(tampered(position, format!("invalid proof {}", block.hash())));
            }

            prev_hash = block.hash().clone();
        }

        Ok(())
    }
}

fn tampered(position: usize, reason: String) -> ConsensusError {
    ConsensusError::TamperedChain { position, reason }
}
