//! Minechain Node - proof-of-work ledger node.
//!
//! Command-line entry point: mine a block, verify a chain dump, or run an
//! in-process multi-node simulation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use minechain_node::observability::{init_logging, LogFormat};
use minechain_node::Config;
use std::path::PathBuf;

mod commands;

/// Minechain - proof-of-work ledger with longest-chain consensus
#[derive(Parser, Debug)]
#[command(name = "minechain-node")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Number of leading hex zeros a block hash must carry
    #[arg(long)]
    difficulty: Option<usize>,

    /// Address this node announces to peers
    #[arg(long)]
    node_address: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit transactions, mine one block and print the chain
    Mine {
        /// Transaction as AUTHOR:CONTENT (repeatable)
        #[arg(long = "tx", value_name = "AUTHOR:CONTENT")]
        txs: Vec<String>,
    },

    /// Validate a chain dump read from a file or stdin
    Verify {
        /// Chain dump path (default: stdin)
        path: Option<PathBuf>,
    },

    /// Run several in-process nodes and report whether they converge
    Simulate {
        /// Number of nodes
        #[arg(long, default_value_t = 3)]
        nodes: usize,

        /// Number of mining rounds
        #[arg(long, default_value_t = 5)]
        rounds: usize,

        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(difficulty) = cli.difficulty {
        config.chain.difficulty = difficulty;
    }
    if let Some(address) = &cli.node_address {
        config.node_address = address.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.log_level, LogFormat::parse(&config.log_format));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        difficulty = config.chain.difficulty,
        "Starting Minechain node"
    );

    match cli.command {
        Commands::Mine { txs } => commands::mine(&config, &txs).await,
        Commands::Verify { path } => commands::verify(&config, path.as_deref()),
        Commands::Simulate {
            nodes,
            rounds,
            seed,
        } => commands::simulate(&config, nodes, rounds, seed).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
