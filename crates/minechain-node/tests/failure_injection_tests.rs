//! Failure injection tests.
//!
//! Peers that are down, slow, or serve forged data must never corrupt the
//! local chain or stall a consensus sweep.

use async_trait::async_trait;
use minechain_consensus::{Block, BlockHash, ChainDump, ConsensusError, Resolution};
use minechain_node::{Config, LocalTransport, Node, NodeError, PeerTransport, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// Failure Injection Infrastructure
// ============================================================================

/// What a [`FaultyTransport`] does to traffic for the targeted peer.
#[derive(Clone, Copy)]
enum Fault {
    /// Rewrites a transaction in the last block, keeping its hash.
    TamperContent,
    /// Re-points the last block at a different parent.
    TamperPrevHash,
    /// Never answers.
    Hang,
}

/// Wraps a [`LocalTransport`], corrupting traffic for one peer.
struct FaultyTransport {
    inner: Arc<LocalTransport>,
    target: String,
    fault: Fault,
}

impl FaultyTransport {
    fn corrupt(&self, mut dump: ChainDump) -> ChainDump {
        let Some(last) = dump.chain.pop() else {
            return dump;
        };
        let (mut payload, nonce, hash) = last.into_parts();
        match self.fault {
            Fault::TamperContent => {
                if let Some(tx) = payload.transactions.first_mut() {
                    tx.content.push_str(" (forged)");
                }
            }
            Fault::TamperPrevHash => payload.prev_hash = BlockHash::from("00".repeat(32)),
            Fault::Hang => {}
        }
        dump.chain.push(Block::from_parts(payload, nonce, hash));
        dump
    }
}

#[async_trait]
impl PeerTransport for FaultyTransport {
    async fn broadcast_block(&self, peer: &str, block: &Block) -> Result<(), TransportError> {
        self.inner.broadcast_block(peer, block).await
    }

    async fn fetch_chain(&self, peer: &str) -> Result<ChainDump, TransportError> {
        if peer != self.target {
            return self.inner.fetch_chain(peer).await;
        }
        if let Fault::Hang = self.fault {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let dump = self.inner.fetch_chain(peer).await?;
        Ok(self.corrupt(dump))
    }

    async fn register_with(&self, peer: &str, own: &str) -> Result<ChainDump, TransportError> {
        let dump = self.inner.register_with(peer, own).await?;
        if peer == self.target {
            return Ok(self.corrupt(dump));
        }
        Ok(dump)
    }
}

fn config(address: &str, peers: &[&str]) -> Config {
    Config {
        node_address: address.to_string(),
        peers: peers.iter().map(|p| p.to_string()).collect(),
        fetch_timeout_ms: 200,
        ..Default::default()
    }
}

fn faulty_node(net: &Arc<LocalTransport>, cfg: &Config, target: &str, fault: Fault) -> Arc<Node> {
    let transport = Arc::new(FaultyTransport {
        inner: Arc::clone(net),
        target: target.to_string(),
        fault,
    });
    let node = Arc::new(Node::new(cfg, transport).unwrap());
    net.attach(&node);
    node
}

async fn mine_blocks(node: &Node, count: usize) {
    for i in 0..count {
        node.submit_transaction(&json!({"author": node.address(), "content": format!("tx {i}")}))
            .unwrap();
        node.mine().await.unwrap().unwrap();
    }
}

// ============================================================================
// Tampered Data
// ============================================================================

#[tokio::test]
async fn test_tampered_longer_chain_is_rejected() {
    for fault in [Fault::TamperContent, Fault::TamperPrevHash] {
        let net = LocalTransport::new();
        let forger = net.spawn_node(&config("forger", &[])).unwrap();
        mine_blocks(&forger, 3).await;

        let victim = faulty_node(&net, &config("victim", &["forger"]), "forger", fault);
        mine_blocks(&victim, 1).await;
        let before = victim.current_chain();

        assert_eq!(victim.resolve_with_peers().await, Resolution::Unchanged);
        assert_eq!(victim.current_chain(), before);
    }
}

#[tokio::test]
async fn test_honest_peer_wins_over_forger() {
    let net = LocalTransport::new();
    let forger = net.spawn_node(&config("forger", &[])).unwrap();
    let honest = net.spawn_node(&config("honest", &[])).unwrap();
    mine_blocks(&forger, 4).await;
    mine_blocks(&honest, 2).await;

    let victim = faulty_node(
        &net,
        &config("victim", &["forger", "honest"]),
        "forger",
        Fault::TamperContent,
    );

    assert_eq!(victim.resolve_with_peers().await, Resolution::Adopted { length: 3 });
    assert_eq!(victim.engine().last_block(), honest.engine().last_block());
}

#[tokio::test]
async fn test_bootstrap_from_tampered_dump_fails() {
    let net = LocalTransport::new();
    let forger = net.spawn_node(&config("forger", &[])).unwrap();
    mine_blocks(&forger, 2).await;

    let victim = faulty_node(&net, &config("victim", &[]), "forger", Fault::TamperContent);
    let err = victim.register_with("forger").await.unwrap_err();

    assert!(matches!(
        err,
        NodeError::Consensus(ConsensusError::TamperedChain { position: 2, .. })
    ));
    assert_eq!(victim.engine().len(), 1);
    assert!(!victim.peers().contains(&"forger".to_string()));
}

#[tokio::test]
async fn test_forged_gossip_is_discarded() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let b = net.spawn_node(&config("b", &[])).unwrap();
    mine_blocks(&a, 1).await;

    let (payload, nonce, _) = a.engine().last_block().into_parts();
    let forged = Block::from_parts(payload, nonce, BlockHash::from("00".repeat(32)));

    assert!(matches!(
        b.accept_block(forged),
        Err(NodeError::Consensus(ConsensusError::InvalidProof { index: 1 }))
    ));
    assert_eq!(b.engine().len(), 1);
}

// ============================================================================
// Unavailable Peers
// ============================================================================

#[tokio::test]
async fn test_unreachable_peer_is_skipped() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let down = net.spawn_node(&config("down", &[])).unwrap();
    mine_blocks(&a, 2).await;
    mine_blocks(&down, 5).await;
    net.set_unreachable("down", true);

    let b = net.spawn_node(&config("b", &["down", "ghost", "a"])).unwrap();

    assert_eq!(b.resolve_with_peers().await, Resolution::Adopted { length: 3 });
    assert_eq!(b.engine().last_block(), a.engine().last_block());
}

#[tokio::test]
async fn test_hanging_peer_times_out() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let _slow = net.spawn_node(&config("slow", &[])).unwrap();
    mine_blocks(&a, 1).await;

    let victim = faulty_node(&net, &config("victim", &["slow", "a"]), "slow", Fault::Hang);

    let started = Instant::now();
    assert_eq!(victim.resolve_with_peers().await, Resolution::Adopted { length: 2 });
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_mining_with_every_peer_down() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &["x", "y"])).unwrap();

    mine_blocks(&a, 2).await;
    assert_eq!(a.engine().len(), 3);
}
