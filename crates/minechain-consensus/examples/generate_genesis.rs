//! Generate chain parameters and the matching genesis dump for a devnet.
//!
//! Every node started with the printed parameters derives the same genesis
//! block, so they can exchange chains from the first round.
//!
//! Usage:
//!   cargo run --example generate_genesis -- [DIFFICULTY] > genesis.json

use minechain_consensus::{ChainDump, ChainParams, Validator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let difficulty = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => minechain_consensus::DEFAULT_DIFFICULTY,
    };

    let params = ChainParams {
        difficulty,
        // Fixed timestamp for reproducibility
        genesis_timestamp: 1_703_116_800_000,
    };
    params.validate()?;

    let genesis = params.genesis_block();
    let dump = ChainDump::new(vec![genesis], Vec::new());
    debug_assert!(Validator::new(difficulty).is_valid_chain(&dump.chain));

    tracing::info!(difficulty, hash = %dump.chain[0].hash(), "generated genesis");

    let out = serde_json::json!({
        "chain": params,
        "genesis": dump,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
