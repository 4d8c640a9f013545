//! Peer transport boundary.
//!
//! The node never talks to the network directly. Everything that crosses
//! process boundaries goes through a [`PeerTransport`], so the ledger core can
//! be driven by HTTP, a message bus, or the in-memory
//! [`LocalTransport`](crate::LocalTransport) used in tests and simulations.

use crate::error::NodeError;
use async_trait::async_trait;
use minechain_consensus::{Block, ChainDump};

/// Errors that can occur during transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer could not be reached.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The peer answered with something that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The peer received the request and refused it.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Attaches the peer address, producing a node-level error.
    pub fn for_peer(self, peer: &str) -> NodeError {
        let peer = peer.to_string();
        match self {
            TransportError::Unreachable(reason) => NodeError::PeerUnreachable { peer, reason },
            TransportError::Malformed(reason) => NodeError::MalformedPeerResponse { peer, reason },
            TransportError::Rejected(reason) => NodeError::MalformedPeerResponse {
                peer,
                reason: format!("rejected: {reason}"),
            },
        }
    }
}

/// Async transport used by a node to reach its peers.
///
/// Implementations must not call back into the calling node while holding
/// any of its locks; the node never holds a ledger lock across these calls.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Delivers a freshly mined block to `peer`. Best effort; the caller
    /// logs and ignores failures.
    async fn broadcast_block(&self, peer: &str, block: &Block) -> Result<(), TransportError>;

    /// Fetches `peer`'s current chain dump.
    async fn fetch_chain(&self, peer: &str) -> Result<ChainDump, TransportError>;

    /// Registers `own_address` with `peer` and returns `peer`'s chain dump.
    async fn register_with(&self, peer: &str, own_address: &str)
        -> Result<ChainDump, TransportError>;
}
