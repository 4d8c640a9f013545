//! Proof-of-work nonce search.

use crate::block::{BlockHash, BlockPayload};

/// Result of a successful nonce search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seal {
    /// The nonce that satisfied the difficulty predicate.
    pub nonce: u64,

    /// The hash produced with that nonce.
    pub hash: BlockHash,
}

/// Leading-zero proof-of-work puzzle.
///
/// Finding a nonce takes about `16^difficulty` hashes; checking one takes a
/// single hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    /// Creates a puzzle requiring `difficulty` leading hex zeros.
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    /// Returns the difficulty.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Searches nonces `0, 1, 2, ..` until the hash meets the difficulty.
    ///
    /// Unbounded; callers that need a deadline must impose it themselves.
    pub fn seal(&self, payload: &BlockPayload) -> Seal {
        let encoded = payload.encode();
        let mut nonce: u64 = 0;

        loop {
            let hash = encoded.hash_with(nonce);
            if hash.meets_difficulty(self.difficulty) {
                tracing::debug!(
                    index = payload.index,
                    nonce,
                    hash = %hash,
                    "found proof of work"
                );
                return Seal { nonce, hash };
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    /// Returns true if `hash` satisfies the difficulty predicate.
    pub fn accepts(&self, hash: &BlockHash) -> bool {
        hash.meets_difficulty(self.difficulty)
    }
}
