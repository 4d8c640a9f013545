//! Node error types.

use minechain_consensus::ConsensusError;
use thiserror::Error;

/// Errors that can occur at the node boundary.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Ledger or validation failure.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// A peer could not be reached.
    #[error("peer unreachable: {peer}: {reason}")]
    PeerUnreachable {
        /// Peer address.
        peer: String,
        /// Transport-level reason.
        reason: String,
    },

    /// A peer answered with something that is not a usable chain dump.
    #[error("malformed response from {peer}: {reason}")]
    MalformedPeerResponse {
        /// Peer address.
        peer: String,
        /// What was wrong with the response.
        reason: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A background task failed.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
