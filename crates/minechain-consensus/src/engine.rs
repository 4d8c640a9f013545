//! Thread-safe ledger owner.
//!
//! [`ChainEngine`] wraps a [`Ledger`] with the node's locking discipline:
//!
//! - Readers (chain snapshots, pending transactions) take a shared lock.
//! - Mining holds the exclusive lock only to snapshot the mempool and to
//!   append; the nonce search itself runs unlocked.
//! - At most one mine runs at a time; a second concurrent request is
//!   rejected with [`ConsensusError::MiningInProgress`].
//! - Ledger replacement swaps chain and mempool together under the exclusive
//!   lock.
//!
//! No method performs I/O.

use crate::block::Block;
use crate::error::{ConsensusError, Result};
use crate::ledger::Ledger;
use crate::mempool::TxSeq;
use crate::pow::ProofOfWork;
use crate::resolver::{ConsensusResolver, Resolution};
use crate::transaction::Transaction;
use parking_lot::{Mutex, RwLock};

/// Concurrent access point to a node's ledger.
#[derive(Debug)]
pub struct ChainEngine {
    /// The ledger; never held across a nonce search.
    ledger: RwLock<Ledger>,

    /// Held for the full duration of a mine.
    mining: Mutex<()>,

    /// Nonce search parameters.
    pow: ProofOfWork,

    /// Chain reconstruction and selection.
    resolver: ConsensusResolver,
}

impl ChainEngine {
    /// Creates an engine owning `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        let difficulty = ledger.difficulty();
        Self {
            ledger: RwLock::new(ledger),
            mining: Mutex::new(()),
            pow: ProofOfWork::new(difficulty),
            resolver: ConsensusResolver::new(difficulty),
        }
    }

    /// Returns the difficulty.
    pub fn difficulty(&self) -> usize {
        self.pow.difficulty()
    }

    /// Returns the resolver configured for this chain.
    pub fn resolver(&self) -> &ConsensusResolver {
        &self.resolver
    }

    /// Admits a transaction. Safe to call while a mine is in progress.
    pub fn submit(&self, transaction: Transaction) -> TxSeq {
        self.ledger.write().add_transaction(transaction)
    }

    /// Returns a copy of the current chain.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger.read().chain().to_vec()
    }

    /// Returns the chain and the pending transactions, read under one lock.
    pub fn snapshot(&self) -> (Vec<Block>, Vec<Transaction>) {
        let ledger = self.ledger.read();
        (ledger.chain().to_vec(), ledger.pending())
    }

    /// Returns the chain length.
    pub fn len(&self) -> usize {
        self.ledger.read().len()
    }

    /// Returns true if the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.ledger.read().is_empty()
    }

    /// Returns the current tip.
    pub fn last_block(&self) -> Block {
        self.ledger.read().last_block().clone()
    }

    /// Returns the pending transactions in admission order.
    pub fn pending(&self) -> Vec<Transaction> {
        self.ledger.read().pending()
    }

    /// Returns true while a mine is running.
    pub fn is_mining(&self) -> bool {
        self.mining.is_locked()
    }

    /// Mines the current mempool into a block.
    ///
    /// Returns `Ok(None)` if nothing was pending. If the ledger was replaced
    /// while the nonce search ran, the block no longer links to the tip and
    /// the append fails; the mempool is whatever the adopted ledger carried.
    pub fn mine(&self) -> Result<Option<Block>> {
        let _mining = self
            .mining
            .try_lock()
            .ok_or(ConsensusError::MiningInProgress)?;

        let Some(candidate) = self.ledger.read().prepare_candidate()? else {
            tracing::debug!("no transactions to mine");
            return Ok(None);
        };

        let index = candidate.payload.index;
        let tx_count = candidate.included.len();
        tracing::debug!(index, tx_count, difficulty = self.difficulty(), "mining block");

        let seal = self.pow.seal(&candidate.payload);

        let block = {
            let mut ledger = self.ledger.write();
            match ledger.commit(candidate, seal) {
                Ok(block) => block.clone(),
                Err(e) => {
                    tracing::warn!(index, error = %e, "discarding mined block");
                    return Err(e);
                }
            }
        };

        tracing::info!(
            index,
            tx_count,
            nonce = block.nonce(),
            hash = %block.hash(),
            "mined block"
        );

        Ok(Some(block))
    }

    /// Appends a block received from a peer.
    pub fn append(&self, block: Block) -> Result<Block> {
        let mut ledger = self.ledger.write();
        ledger.append(block).cloned()
    }

    /// Rebuilds `raw` and installs it in place of the local chain, whatever
    /// its length. Used when bootstrapping from an existing peer.
    pub fn install(&self, raw: Vec<Block>) -> Result<usize> {
        let rebuilt = self.resolver.reconstruct_chain(raw)?;
        let length = rebuilt.len();
        self.ledger.write().adopt(rebuilt);

        tracing::info!(length, "installed chain");
        Ok(length)
    }

    /// Applies the longest-valid-chain rule to already reconstructed
    /// candidates.
    ///
    /// Validation runs outside the lock; the swap re-checks the length under
    /// the lock in case the local chain grew in the meantime.
    pub fn resolve<I>(&self, candidates: I) -> Resolution
    where
        I: IntoIterator<Item = Ledger>,
    {
        let local_len = self.len();
        let Some(winner) = self.resolver.select_longest(local_len, candidates) else {
            return Resolution::Unchanged;
        };

        let mut ledger = self.ledger.write();
        let length = winner.len();
        if length <= ledger.len() {
            tracing::debug!(length, local = ledger.len(), "local chain grew, keeping it");
            return Resolution::Unchanged;
        }

        ledger.adopt(winner);
        tracing::info!(length, "adopted longer chain");

        Resolution::Adopted { length }
    }
}
