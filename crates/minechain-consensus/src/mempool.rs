//! Transaction mempool for pending transactions.
//!
//! The mempool holds transactions that have been submitted but not yet
//! included in a block. It is unbounded, keeps admission order and does not
//! deduplicate.

use crate::transaction::Transaction;
use std::collections::{HashSet, VecDeque};

/// Admission sequence number, unique within one mempool.
pub type TxSeq = u64;

/// A point-in-time copy of the mempool contents.
#[derive(Debug, Clone, Default)]
pub struct MempoolSnapshot {
    /// Transactions in admission order.
    pub transactions: Vec<Transaction>,

    /// Sequence numbers matching `transactions`.
    pub seqs: Vec<TxSeq>,
}

impl MempoolSnapshot {
    /// Returns true if the snapshot holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// The transaction mempool.
#[derive(Debug, Default)]
pub struct Mempool {
    /// Pending transactions in arrival order.
    entries: VecDeque<(TxSeq, Transaction)>,

    /// Next sequence number to hand out. Never reset, so a sequence number
    /// taken before a [`clear`](Self::clear) cannot match a later entry.
    next_seq: TxSeq,
}

impl Mempool {
    /// Creates an empty mempool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transaction to the mempool.
    pub fn add(&mut self, transaction: Transaction) -> TxSeq {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back((seq, transaction));

        tracing::trace!(seq, "added transaction to mempool");

        seq
    }

    /// Returns the number of pending transactions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mempool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the pending transactions in admission order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.entries.iter().map(|(_, tx)| tx.clone()).collect()
    }

    /// Copies the entire mempool, in admission order, for block building.
    pub fn snapshot(&self) -> MempoolSnapshot {
        let (seqs, transactions) = self.entries.iter().cloned().unzip();
        MempoolSnapshot { transactions, seqs }
    }

    /// Removes exactly the given transactions. Anything added after the
    /// snapshot they came from stays pending.
    pub fn remove_batch(&mut self, seqs: &[TxSeq]) {
        let batch: HashSet<TxSeq> = seqs.iter().copied().collect();
        self.entries.retain(|(seq, _)| !batch.contains(seq));

        tracing::debug!(count = seqs.len(), "removed batch from mempool");
    }

    /// Drops every pending transaction.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
