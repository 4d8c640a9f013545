//! The accepted chain plus the pending-transaction pool.
//!
//! [`Ledger::append`] is the only way a block enters a chain, whether it was
//! mined locally, gossiped by a peer or replayed from a chain dump.

use crate::block::{Block, BlockPayload};
use crate::error::{ConsensusError, Result};
use crate::genesis::ChainParams;
use crate::mempool::{Mempool, TxSeq};
use crate::pow::{ProofOfWork, Seal};
use crate::transaction::{now_millis, Transaction};
use crate::validator::Validator;

/// A block under construction together with the mempool entries it drains.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Payload to be sealed.
    pub payload: BlockPayload,

    /// Mempool entries included in the payload.
    pub included: Vec<TxSeq>,
}

/// An ordered chain of sealed blocks and a mempool.
///
/// The chain always holds at least the genesis block.
#[derive(Debug)]
pub struct Ledger {
    validator: Validator,
    chain: Vec<Block>,
    mempool: Mempool,
}

impl Ledger {
    /// Creates a ledger holding only the genesis block for `params`.
    pub fn new(params: &ChainParams) -> Self {
        Self::from_genesis(params.genesis_block(), params.difficulty)
    }

    /// Creates a ledger on top of a trusted genesis block.
    ///
    /// Genesis is installed as-is, without any proof check.
    pub fn from_genesis(genesis: Block, difficulty: usize) -> Self {
        Self {
            validator: Validator::new(difficulty),
            chain: vec![genesis],
            mempool: Mempool::new(),
        }
    }

    /// Returns the difficulty blocks are held to.
    pub fn difficulty(&self) -> usize {
        self.validator.difficulty()
    }

    /// Returns the validator used by [`Ledger::append`].
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns the accepted chain.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Returns the chain tip.
    pub fn last_block(&self) -> &Block {
        // Never empty: construction always installs genesis.
        &self.chain[self.chain.len() - 1]
    }

    /// Returns the number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Admits a transaction to the mempool.
    pub fn add_transaction(&mut self, transaction: Transaction) -> TxSeq {
        self.mempool.add(transaction)
    }

    /// Returns the pending transactions in admission order.
    pub fn pending(&self) -> Vec<Transaction> {
        self.mempool.transactions()
    }

    /// Index the next appended block must carry.
    fn next_index(&self) -> Result<u64> {
        let last = self.last_block().index();
        last.checked_add(1).ok_or(ConsensusError::IndexOverflow(last))
    }

    /// Builds the next block from the entire mempool, or `None` if nothing
    /// is pending.
    pub fn prepare_candidate(&self) -> Result<Option<Candidate>> {
        let snapshot = self.mempool.snapshot();
        if snapshot.is_empty() {
            return Ok(None);
        }

        let last = self.last_block();
        let payload = BlockPayload::new(
            self.next_index()?,
            snapshot.transactions,
            now_millis(),
            last.hash().clone(),
        );

        Ok(Some(Candidate {
            payload,
            included: snapshot.seqs,
        }))
    }

    /// Appends a sealed candidate and drops exactly the transactions it
    /// included from the mempool.
    pub fn commit(&mut self, candidate: Candidate, seal: Seal) -> Result<&Block> {
        let block = Block::from_parts(candidate.payload, seal.nonce, seal.hash);
        self.append(block)?;
        self.mempool.remove_batch(&candidate.included);
        Ok(self.last_block())
    }

    /// Drains the mempool into a new sealed block.
    ///
    /// Returns `Ok(None)` and leaves the chain untouched when the mempool is
    /// empty.
    pub fn mine(&mut self) -> Result<Option<Block>> {
        let Some(candidate) = self.prepare_candidate()? else {
            return Ok(None);
        };

        let seal = ProofOfWork::new(self.difficulty()).seal(&candidate.payload);
        let block = self.commit(candidate, seal)?;

        Ok(Some(block.clone()))
    }

    /// Appends a block whose `hash` is its claimed proof.
    ///
    /// Either the chain grows by exactly this block or it is left unchanged.
    pub fn append(&mut self, block: Block) -> Result<&Block> {
        let last = self.last_block();

        if block.prev_hash() != last.hash() {
            return Err(ConsensusError::PrevHashMismatch {
                expected: last.hash().to_string(),
                actual: block.prev_hash().to_string(),
            });
        }

        let expected_index = self.next_index()?;
        if block.index() != expected_index {
            return Err(ConsensusError::IndexMismatch {
                expected: expected_index,
                actual: block.index(),
            });
        }

        if !self.validator.is_valid_block(&block) {
            return Err(ConsensusError::InvalidProof {
                index: block.index(),
            });
        }

        tracing::debug!(
            index = block.index(),
            hash = %block.hash(),
            tx_count = block.tx_count(),
            "appended block"
        );

        self.chain.push(block);
        Ok(self.last_block())
    }

    /// Takes over `other` in full: its chain replaces the local one and the
    /// local mempool is emptied to match `other`'s.
    ///
    /// Pending transactions that `other` does not carry are dropped.
    /// Sequence numbers keep counting up, so a candidate prepared before the
    /// swap cannot drain entries admitted after it.
    pub fn adopt(&mut self, other: Ledger) {
        self.chain = other.chain;
        self.mempool.clear();
        for transaction in other.mempool.transactions() {
            self.mempool.add(transaction);
        }
    }

    /// Consumes the ledger, returning its chain.
    pub fn into_chain(self) -> Vec<Block> {
        self.chain
    }
}
