//! The node facade.
//!
//! [`Node`] is the boundary layer around a [`ChainEngine`]: it validates
//! client submissions, keeps the peer list, and drives the [`PeerTransport`]
//! for gossip, bootstrap and consensus sweeps. Transport calls never happen
//! while a ledger lock is held.

use crate::config::Config;
use crate::error::{NodeError, Result};
use crate::peer::PeerSet;
use crate::transport::PeerTransport;
use crate::validation::validate_transaction;
use futures::future::join_all;
use minechain_consensus::{
    now_millis, Block, ChainDump, ChainEngine, ConsensusError, Ledger, Resolution, Transaction,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A consistent view of the chain together with the mempool.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    /// The chain and known peers.
    #[serde(flatten)]
    pub dump: ChainDump,

    /// Transactions waiting to be mined, in admission order.
    pub pending: Vec<Transaction>,
}

/// A Minechain node.
pub struct Node {
    /// This node's own address; always present in `peers`.
    address: String,

    /// The ledger behind its locking discipline.
    engine: Arc<ChainEngine>,

    /// Known peers, own address included.
    peers: PeerSet,

    /// How peers are reached.
    transport: Arc<dyn PeerTransport>,

    /// Deadline for a single peer fetch during a consensus sweep.
    fetch_timeout: Duration,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("address", &self.address)
            .field("length", &self.engine.len())
            .field("peers", &self.peers.len())
            .finish()
    }
}

impl Node {
    /// Creates a node with a fresh genesis chain.
    pub fn new(config: &Config, transport: Arc<dyn PeerTransport>) -> Result<Self> {
        config.validate()?;

        let address = config.node_address.trim().to_string();
        let peers = PeerSet::new();
        peers.add(&address);
        peers.extend(&config.peers);

        let engine = Arc::new(ChainEngine::new(Ledger::new(&config.chain)));

        tracing::info!(
            address = %address,
            difficulty = config.chain.difficulty,
            peers = peers.len(),
            "node created"
        );

        Ok(Self {
            address,
            engine,
            peers,
            transport,
            fetch_timeout: config.fetch_timeout(),
        })
    }

    /// Returns this node's address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &Arc<ChainEngine> {
        &self.engine
    }

    /// Returns the known peers in insertion order, own address included.
    pub fn peers(&self) -> Vec<String> {
        self.peers.list()
    }

    /// Validates and admits a client submission.
    pub fn submit_transaction(&self, raw: &Value) -> Result<Transaction> {
        let transaction = match validate_transaction(raw, now_millis()) {
            Ok(tx) => tx,
            Err(e) => {
                tracing::debug!(error = %e, "rejected submission");
                return Err(e.into());
            }
        };

        let seq = self.engine.submit(transaction.clone());
        tracing::debug!(seq, author = %transaction.author, "transaction admitted");

        Ok(transaction)
    }

    /// Returns the pending transactions in admission order.
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.engine.pending()
    }

    /// Returns the chain dump served to peers.
    pub fn current_chain(&self) -> ChainDump {
        ChainDump::new(self.engine.chain_snapshot(), self.peers.list())
    }

    /// Returns the chain and mempool read together.
    pub fn snapshot(&self) -> NodeSnapshot {
        let (chain, pending) = self.engine.snapshot();
        NodeSnapshot {
            dump: ChainDump::new(chain, self.peers.list()),
            pending,
        }
    }

    /// Mines the mempool into a block and announces it to every other peer.
    ///
    /// The nonce search runs on the blocking pool. Returns `Ok(None)` when
    /// there was nothing to mine.
    pub async fn mine(&self) -> Result<Option<Block>> {
        let engine = self.engine.clone();
        let mined = tokio::task::spawn_blocking(move || engine.mine())
            .await
            .map_err(|e| NodeError::Internal(format!("mining task failed: {e}")))??;

        if let Some(block) = &mined {
            self.announce(block).await;
        }

        Ok(mined)
    }

    async fn announce(&self, block: &Block) {
        let others = self.peers.others(&self.address);
        let sends = others.iter().map(|peer| async move {
            (peer, self.transport.broadcast_block(peer, block).await)
        });

        for (peer, outcome) in join_all(sends).await {
            if let Err(e) = outcome {
                tracing::warn!(peer = %peer, index = block.index(), error = %e, "broadcast failed");
            }
        }
    }

    /// Records a peer that registered with this node and returns this node's
    /// chain dump for it to bootstrap from.
    pub fn register_peer(&self, address: &str) -> Result<ChainDump> {
        if address.trim().is_empty() {
            return Err(ConsensusError::MissingField("node_address").into());
        }

        if self.peers.add(address) {
            tracing::info!(peer = %address.trim(), "peer registered");
        }

        Ok(self.current_chain())
    }

    /// Registers with an existing peer and adopts its chain and peer list.
    ///
    /// The peer is recorded only once its dump has been installed. Returns
    /// the adopted chain length.
    pub async fn register_with(&self, peer: &str) -> Result<usize> {
        let peer = peer.trim();
        if peer.is_empty() {
            return Err(ConsensusError::MissingField("node_address").into());
        }

        let dump = self
            .transport
            .register_with(peer, &self.address)
            .await
            .map_err(|e| e.for_peer(peer))?;

        let length = self.register_and_merge(dump)?;
        self.peers.add(peer);
        Ok(length)
    }

    /// Replaces the local ledger with a reconstructed dump, whatever its
    /// length, and merges the sender's peer list. Pending transactions are
    /// dropped along with the old chain.
    ///
    /// A dump that fails reconstruction leaves the node unchanged.
    pub fn register_and_merge(&self, dump: ChainDump) -> Result<usize> {
        if dump.length != dump.chain.len() {
            tracing::debug!(
                claimed = dump.length,
                actual = dump.chain.len(),
                "dump length disagrees with chain"
            );
        }

        let length = self.engine.install(dump.chain)?;
        let added = self.peers.extend(&dump.peers);

        tracing::info!(length, new_peers = added, "bootstrapped from peer dump");
        Ok(length)
    }

    /// Appends a block gossiped by a peer. On failure the block is dropped.
    pub fn accept_block(&self, block: Block) -> Result<Block> {
        let index = block.index();
        match self.engine.append(block) {
            Ok(block) => {
                tracing::info!(index, hash = %block.hash(), "accepted gossiped block");
                Ok(block)
            }
            Err(e) => {
                tracing::debug!(index, error = %e, "discarded gossiped block");
                Err(e.into())
            }
        }
    }

    /// Fetches every other peer's chain and adopts the longest valid one if
    /// it is strictly longer than the local chain.
    ///
    /// Peers that fail, time out, or send garbage are skipped.
    pub async fn resolve_with_peers(&self) -> Resolution {
        let others = self.peers.others(&self.address);
        let fetches = others.iter().map(|peer| async move {
            match tokio::time::timeout(self.fetch_timeout, self.transport.fetch_chain(peer)).await
            {
                Ok(Ok(dump)) => Some(dump),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e.for_peer(peer), "skipping peer");
                    None
                }
                Err(_) => {
                    tracing::warn!(peer = %peer, timeout = ?self.fetch_timeout, "peer fetch timed out");
                    None
                }
            }
        });

        let dumps: Vec<ChainDump> = join_all(fetches).await.into_iter().flatten().collect();
        self.resolve_with_dumps(dumps)
    }

    /// Applies the longest-valid-chain rule to dumps obtained by other means.
    ///
    /// Candidates are considered in the order given.
    pub fn resolve_with_dumps<I>(&self, dumps: I) -> Resolution
    where
        I: IntoIterator<Item = ChainDump>,
    {
        let local_len = self.engine.len();
        let resolver = self.engine.resolver();

        let candidates: Vec<Ledger> = dumps
            .into_iter()
            .filter(|dump| dump.chain.len() > local_len)
            .filter_map(|dump| match resolver.reconstruct_chain(dump.chain) {
                Ok(ledger) => Some(ledger),
                Err(e) => {
                    tracing::warn!(error = %e, "rejected candidate chain");
                    None
                }
            })
            .collect();

        let resolution = self.engine.resolve(candidates);
        if resolution == Resolution::Unchanged {
            tracing::debug!(length = local_len, "local chain kept");
        }
        resolution
    }
}
