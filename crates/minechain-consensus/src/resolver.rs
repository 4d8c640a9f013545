//! Chain reconstruction and the longest-valid-chain rule.

use crate::block::{Block, BlockHash};
use crate::error::{ConsensusError, Result};
use crate::ledger::Ledger;
use crate::validator::Validator;

/// Outcome of a resolution round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A longer valid chain replaced the local one.
    Adopted {
        /// Length of the adopted chain.
        length: usize,
    },
    /// The local chain was kept.
    Unchanged,
}

/// Rebuilds peer chains and decides whether they replace the local one.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusResolver {
    validator: Validator,
}

impl ConsensusResolver {
    /// Creates a resolver for the given difficulty.
    pub fn new(difficulty: usize) -> Self {
        Self {
            validator: Validator::new(difficulty),
        }
    }

    /// Replays raw blocks through [`Ledger::append`].
    ///
    /// The first record is installed as genesis without a proof check, but
    /// it must sit at index 0 on the genesis parent sentinel. Every later
    /// record must append cleanly. Any failure aborts the whole replay and
    /// nothing partial is returned.
    pub fn reconstruct_chain(&self, raw: Vec<Block>) -> Result<Ledger> {
        let mut blocks = raw.into_iter();
        let genesis = blocks.next().ok_or(ConsensusError::EmptyChain)?;
        check_genesis(&genesis)?;
        let mut ledger = Ledger::from_genesis(genesis, self.validator.difficulty());

        for (offset, block) in blocks.enumerate() {
            let position = offset + 1;
            if let Err(e) = ledger.append(block) {
                tracing::warn!(position, error = %e, "rejecting tampered chain");
                return Err(ConsensusError::TamperedChain {
                    position,
                    reason: e.to_string(),
                });
            }
        }

        Ok(ledger)
    }

    /// Picks the replacement for a local chain of `local_len` blocks.
    ///
    /// A candidate qualifies only if it is strictly longer than the best
    /// length seen so far and passes full validation. Among equally long
    /// candidates the first one encountered wins.
    pub fn select_longest<I>(&self, local_len: usize, candidates: I) -> Option<Ledger>
    where
        I: IntoIterator<Item = Ledger>,
    {
        let mut best_len = local_len;
        let mut best = None;

        for candidate in candidates {
            let length = candidate.len();
            if length <= best_len {
                tracing::trace!(length, best_len, "candidate not longer");
                continue;
            }

            if let Err(e) = self.validator.check_chain(candidate.chain()) {
                tracing::warn!(length, error = %e, "discarding invalid candidate chain");
                continue;
            }

            best_len = length;
            best = Some(candidate);
        }

        best
    }

    /// Applies the longest-valid-chain rule to `local`.
    ///
    /// On adoption `local` takes over the winner in full, mempool included.
    pub fn resolve<I>(&self, mut local: Ledger, candidates: I) -> (Ledger, Resolution)
    where
        I: IntoIterator<Item = Ledger>,
    {
        match self.select_longest(local.len(), candidates) {
            Some(winner) => {
                let length = winner.len();
                local.adopt(winner);
                tracing::info!(length, "adopted longer chain");
                (local, Resolution::Adopted { length })
            }
            None => (local, Resolution::Unchanged),
        }
    }
}

fn check_genesis(genesis: &Block) -> Result<()> {
    let reason = if genesis.index() != 0 {
        format!("genesis index is {}", genesis.index())
    } else if genesis.prev_hash().as_str() != BlockHash::GENESIS_PARENT {
        format!("genesis prev_hash is {:?}", genesis.prev_hash().as_str())
    } else {
        return Ok(());
    };

    tracing::warn!(%reason, "rejecting chain with malformed genesis");
    Err(ConsensusError::TamperedChain {
        position: 0,
        reason,
    })
}
