//! Multi-node replication tests.
//!
//! These tests verify that:
//! 1. A node can bootstrap from an existing peer
//! 2. A mined block is gossiped to every other known peer
//! 3. A lagging node adopts the longest valid chain on resolve
//! 4. Equally long chains never displace the local one

use minechain_consensus::Resolution;
use minechain_node::{Config, LocalTransport, Node};
use serde_json::json;
use std::sync::Arc;

fn config(address: &str, peers: &[&str]) -> Config {
    Config {
        node_address: address.to_string(),
        peers: peers.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
}

async fn mine_one(node: &Node, content: &str) {
    node.submit_transaction(&json!({"author": node.address(), "content": content}))
        .unwrap();
    node.mine().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_bootstrap_via_register_with() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    mine_one(&a, "one").await;
    mine_one(&a, "two").await;

    let b = net.spawn_node(&config("b", &[])).unwrap();
    let length = b.register_with("a").await.unwrap();

    assert_eq!(length, 3);
    assert_eq!(b.current_chain().chain, a.current_chain().chain);
    assert_eq!(a.peers(), vec!["a", "b"]);
    assert_eq!(b.peers(), vec!["b", "a"]);
}

#[tokio::test]
async fn test_mined_block_reaches_all_peers() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let b = net.spawn_node(&config("b", &[])).unwrap();
    let c = net.spawn_node(&config("c", &[])).unwrap();
    b.register_with("a").await.unwrap();
    c.register_with("a").await.unwrap();

    mine_one(&a, "hello").await;

    let tip = a.engine().last_block();
    for node in [&b, &c] {
        assert_eq!(node.engine().len(), 2, "{}", node.address());
        assert_eq!(node.engine().last_block(), tip);
    }
}

#[tokio::test]
async fn test_lagging_node_adopts_longest_chain() {
    let net = LocalTransport::new();
    // a does not know b, so nothing is gossiped to b
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let b = net.spawn_node(&config("b", &["a"])).unwrap();

    for i in 0..3 {
        mine_one(&a, &format!("block {i}")).await;
    }
    assert_eq!(b.engine().len(), 1);

    assert_eq!(b.resolve_with_peers().await, Resolution::Adopted { length: 4 });
    assert_eq!(b.engine().last_block(), a.engine().last_block());

    assert_eq!(b.resolve_with_peers().await, Resolution::Unchanged);
}

#[tokio::test]
async fn test_equal_length_keeps_local() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let b = net.spawn_node(&config("b", &["a"])).unwrap();

    mine_one(&a, "from a").await;
    // b's gossip is refused by a: it no longer links to a's tip
    mine_one(&b, "from b").await;

    let local_tip = b.engine().last_block();
    assert_ne!(local_tip, a.engine().last_block());

    assert_eq!(b.resolve_with_peers().await, Resolution::Unchanged);
    assert_eq!(b.engine().last_block(), local_tip);
}

#[tokio::test]
async fn test_adoption_replaces_pending_transactions() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();
    let b = net.spawn_node(&config("b", &["a"])).unwrap();

    mine_one(&a, "one").await;
    mine_one(&a, "two").await;

    b.submit_transaction(&json!({"author": "b", "content": "waiting"}))
        .unwrap();
    assert_eq!(b.resolve_with_peers().await, Resolution::Adopted { length: 3 });

    assert!(b.pending_transactions().is_empty());
    assert!(b.mine().await.unwrap().is_none());

    b.submit_transaction(&json!({"author": "b", "content": "resubmitted"}))
        .unwrap();
    let block = b.mine().await.unwrap().unwrap();
    assert_eq!(block.index(), 3);
    assert_eq!(block.transactions()[0].content, "resubmitted");
}

#[tokio::test]
async fn test_concurrent_submissions_are_not_lost() {
    let net = LocalTransport::new();
    let a = net.spawn_node(&config("a", &[])).unwrap();

    let submitters: Vec<_> = (0..4)
        .map(|w| {
            let a = Arc::clone(&a);
            tokio::spawn(async move {
                for i in 0..5 {
                    let tx = json!({"author": format!("w{w}"), "content": format!("{i}")});
                    a.submit_transaction(&tx).unwrap();
                }
            })
        })
        .collect();

    let mut mined = 0;
    for _ in 0..3 {
        mined += a.mine().await.unwrap().map_or(0, |b| b.tx_count());
    }
    for handle in submitters {
        handle.await.unwrap();
    }
    while let Some(block) = a.mine().await.unwrap() {
        mined += block.tx_count();
    }

    assert_eq!(mined, 20);
    assert!(a.pending_transactions().is_empty());
    let chain = a.current_chain().chain;
    assert!(a.engine().resolver().reconstruct_chain(chain).is_ok());
}
