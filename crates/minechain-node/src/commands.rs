//! CLI command implementations.

use anyhow::{bail, Context, Result};
use minechain_consensus::{ChainDump, ConsensusResolver, Resolution};
use minechain_node::{Config, LocalTransport, Node};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Splits an `AUTHOR:CONTENT` argument.
pub fn parse_tx(arg: &str) -> Result<(String, String)> {
    match arg.split_once(':') {
        Some((author, content)) => Ok((author.to_string(), content.to_string())),
        None => bail!("expected AUTHOR:CONTENT, got {arg:?}"),
    }
}

/// Submits the given transactions to a fresh node, mines once and prints the
/// resulting chain dump.
pub async fn mine(config: &Config, txs: &[String]) -> Result<()> {
    let net = LocalTransport::new();
    let node = net.spawn_node(config)?;

    for arg in txs {
        let (author, content) = parse_tx(arg)?;
        node.submit_transaction(&json!({"author": author, "content": content}))?;
    }

    match node.mine().await? {
        Some(block) => tracing::info!(index = block.index(), hash = %block.hash(), "block sealed"),
        None => tracing::warn!("no transactions given, nothing mined"),
    }

    println!("{}", node.current_chain().to_json_pretty()?);
    Ok(())
}

/// Reads a chain dump from `path` (or stdin) and validates it.
pub fn verify(config: &Config, path: Option<&Path>) -> Result<()> {
    let bytes = match path {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let dump = ChainDump::from_json(&bytes).context("parsing chain dump")?;
    if dump.length != dump.chain.len() {
        tracing::warn!(
            claimed = dump.length,
            actual = dump.chain.len(),
            "dump length disagrees with chain"
        );
    }

    let resolver = ConsensusResolver::new(config.chain.difficulty);
    let ledger = resolver
        .reconstruct_chain(dump.chain)
        .context("chain rejected")?;
    ledger
        .validator()
        .check_chain(ledger.chain())
        .context("chain rejected")?;

    println!(
        "valid chain: {} blocks, tip {}",
        ledger.len(),
        ledger.last_block().hash()
    );
    Ok(())
}

/// Runs `nodes` in-process nodes for `rounds` rounds of submit, mine, gossip
/// and resolve, then reports each node's view.
pub async fn simulate(config: &Config, nodes: usize, rounds: usize, seed: u64) -> Result<()> {
    if nodes == 0 {
        bail!("need at least one node");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let net = LocalTransport::new();

    let mut cluster: Vec<Arc<Node>> = Vec::with_capacity(nodes);
    for i in 0..nodes {
        let node_config = Config {
            node_address: format!("local://node-{i}"),
            peers: Vec::new(),
            ..config.clone()
        };
        let node = net.spawn_node(&node_config)?;
        if let Some(first) = cluster.first() {
            node.register_with(first.address()).await?;
        }
        cluster.push(node);
    }

    for round in 0..rounds {
        let partitioned = (nodes > 2 && rng.gen_bool(0.3)).then(|| rng.gen_range(0..nodes));
        if let Some(p) = partitioned {
            net.set_unreachable(cluster[p].address(), true);
        }

        let miner = &cluster[rng.gen_range(0..nodes)];
        for t in 0..rng.gen_range(1..=3) {
            miner.submit_transaction(&json!({
                "author": format!("user-{}", rng.gen_range(0..10)),
                "content": format!("round {round} tx {t}"),
            }))?;
        }

        let block = miner.mine().await?;
        tracing::info!(
            round,
            miner = %miner.address(),
            index = block.as_ref().map(|b| b.index()),
            partitioned = ?partitioned.map(|p| cluster[p].address().to_string()),
            "round mined"
        );

        if let Some(p) = partitioned {
            net.set_unreachable(cluster[p].address(), false);
        }

        for node in &cluster {
            if let Resolution::Adopted { length } = node.resolve_with_peers().await {
                tracing::info!(round, node = %node.address(), length, "node caught up");
            }
        }
    }

    let mut tips = BTreeSet::new();
    for node in &cluster {
        let tip = node.engine().last_block();
        println!(
            "{:<20} length={:<4} tip={}",
            node.address(),
            node.engine().len(),
            tip.hash()
        );
        tips.insert(tip.hash().to_string());
    }

    if tips.len() == 1 {
        println!("converged after {rounds} rounds");
    } else {
        println!("{} distinct tips after {rounds} rounds", tips.len());
    }

    Ok(())
}
