//! Consensus error types.

use thiserror::Error;

/// Errors that can occur during ledger and consensus operations.
///
/// Validation failures are ordinary values: a rejected block or chain never
/// leaves the ledger in an intermediate state.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// A submitted transaction lacks a required attribute.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The candidate block does not link to the current chain tip.
    #[error("previous hash mismatch: expected {expected}, got {actual}")]
    PrevHashMismatch {
        /// Hash of the current tip.
        expected: String,
        /// `prev_hash` carried by the candidate.
        actual: String,
    },

    /// The candidate block index does not follow the current tip.
    #[error("index mismatch: expected {expected}, got {actual}")]
    IndexMismatch {
        /// Index the next block must carry.
        expected: u64,
        /// Index carried by the candidate.
        actual: u64,
    },

    /// The chain tip already carries the largest representable index.
    #[error("block index overflow after {0}")]
    IndexOverflow(u64),

    /// The claimed hash fails the difficulty predicate or does not match
    /// the recomputed hash.
    #[error("invalid proof of work for block {index}")]
    InvalidProof {
        /// Index of the offending block.
        index: u64,
    },

    /// A block in the middle of a replayed chain failed validation.
    #[error("tampered chain at position {position}: {reason}")]
    TamperedChain {
        /// Position of the first failing record in the dump.
        position: usize,
        /// Why the record was rejected.
        reason: String,
    },

    /// A chain with no genesis block was supplied.
    #[error("chain is empty")]
    EmptyChain,

    /// Another mining operation is already running on this node.
    #[error("mining already in progress")]
    MiningInProgress,

    /// Chain parameters are out of range.
    #[error("invalid chain parameters: {0}")]
    InvalidParams(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for consensus operations.
pub type Result<T> = std::result::Result<T, ConsensusError>;
