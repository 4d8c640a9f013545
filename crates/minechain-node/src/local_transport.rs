//! In-memory transport implementation for local testing and simulation.
//!
//! Routes requests directly to other [`Node`]s in the same process. Every
//! payload is encoded to JSON and decoded again on the way, so peers see
//! exactly what a networked transport would deliver.

use crate::config::Config;
use crate::error::Result;
use crate::node::Node;
use crate::transport::{PeerTransport, TransportError};
use async_trait::async_trait;
use minechain_consensus::{Block, ChainDump};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

/// In-process network shared by a set of nodes.
///
/// Holds weak references only; a dropped node simply becomes unreachable.
#[derive(Default)]
pub struct LocalTransport {
    nodes: RwLock<HashMap<String, Weak<Node>>>,
    unreachable: RwLock<HashSet<String>>,
}

impl LocalTransport {
    /// Creates an empty network.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a node on this network.
    pub fn spawn_node(self: &Arc<Self>, config: &Config) -> Result<Arc<Node>> {
        let node = Arc::new(Node::new(config, self.clone())?);
        self.attach(&node);
        Ok(node)
    }

    /// Makes `node` reachable under its address.
    pub fn attach(&self, node: &Arc<Node>) {
        self.nodes
            .write()
            .insert(node.address().to_string(), Arc::downgrade(node));
    }

    /// Removes the node at `address` from the network.
    pub fn detach(&self, address: &str) {
        self.nodes.write().remove(address);
    }

    /// Simulates a network partition for `address`.
    pub fn set_unreachable(&self, address: &str, unreachable: bool) {
        let mut set = self.unreachable.write();
        if unreachable {
            set.insert(address.to_string());
        } else {
            set.remove(address);
        }
    }

    fn lookup(&self, address: &str) -> std::result::Result<Arc<Node>, TransportError> {
        if self.unreachable.read().contains(address) {
            return Err(TransportError::Unreachable(format!("{address} is partitioned")));
        }

        self.nodes
            .read()
            .get(address)
            .and_then(Weak::upgrade)
            .ok_or_else(|| TransportError::Unreachable(format!("no node at {address}")))
    }
}

fn over_the_wire<T>(value: &T) -> std::result::Result<T, TransportError>
where
    T: Serialize + DeserializeOwned,
{
    let bytes = serde_json::to_vec(value).map_err(|e| TransportError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Malformed(e.to_string()))
}

#[async_trait]
impl PeerTransport for LocalTransport {
    async fn broadcast_block(
        &self,
        peer: &str,
        block: &Block,
    ) -> std::result::Result<(), TransportError> {
        let node = self.lookup(peer)?;
        let block = over_the_wire(block)?;

        node.accept_block(block)
            .map(|_| ())
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    async fn fetch_chain(&self, peer: &str) -> std::result::Result<ChainDump, TransportError> {
        let node = self.lookup(peer)?;
        over_the_wire(&node.current_chain())
    }

    async fn register_with(
        &self,
        peer: &str,
        own_address: &str,
    ) -> std::result::Result<ChainDump, TransportError> {
        let node = self.lookup(peer)?;
        let dump = node
            .register_peer(own_address)
            .map_err(|e| TransportError::Rejected(e.to_string()))?;
        over_the_wire(&dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(address: &str) -> Config {
        Config {
            node_address: address.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_chain_roundtrips() {
        let net = LocalTransport::new();
        let a = net.spawn_node(&config("a")).unwrap();

        let dump = net.fetch_chain("a").await.unwrap();
        assert_eq!(dump, a.current_chain());
    }

    #[tokio::test]
    async fn test_unknown_and_partitioned_peers() {
        let net = LocalTransport::new();
        let _a = net.spawn_node(&config("a")).unwrap();

        assert!(matches!(
            net.fetch_chain("b").await,
            Err(TransportError::Unreachable(_))
        ));

        net.set_unreachable("a", true);
        assert!(matches!(
            net.fetch_chain("a").await,
            Err(TransportError::Unreachable(_))
        ));

        net.set_unreachable("a", false);
        assert!(net.fetch_chain("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_node_is_unreachable() {
        let net = LocalTransport::new();
        let a = net.spawn_node(&config("a")).unwrap();
        drop(a);

        assert!(matches!(
            net.fetch_chain("a").await,
            Err(TransportError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_rejected_block() {
        let net = LocalTransport::new();
        let a = net.spawn_node(&config("a")).unwrap();
        let genesis = a.engine().last_block();

        assert!(matches!(
            net.broadcast_block("a", &genesis).await,
            Err(TransportError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_register_with_records_peer() {
        let net = LocalTransport::new();
        let a = net.spawn_node(&config("a")).unwrap();

        let dump = net.register_with("a", "b").await.unwrap();
        assert_eq!(dump.peers, vec!["a", "b"]);
        assert_eq!(a.peers(), vec!["a", "b"]);

        net.detach("a");
        assert!(net.register_with("a", "c").await.is_err());
    }
}
