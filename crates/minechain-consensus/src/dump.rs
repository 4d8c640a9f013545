//! Chain dump wire format.
//!
//! A chain dump is what nodes exchange when bootstrapping or resolving:
//!
//! ```json
//! {"length": 2, "chain": [{"index": 0, ...}, {"index": 1, ...}], "peers": ["http://127.0.0.1:8001/"]}
//! ```

use crate::block::Block;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Serialized view of a node's chain and known peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDump {
    /// Number of blocks claimed by the sender.
    pub length: usize,

    /// Blocks in index order, genesis first.
    pub chain: Vec<Block>,

    /// Peer addresses known to the sender.
    #[serde(default)]
    pub peers: Vec<String>,
}

impl ChainDump {
    /// Creates a dump; `length` is derived from `chain`.
    pub fn new(chain: Vec<Block>, peers: Vec<String>) -> Self {
        Self {
            length: chain.len(),
            chain,
            peers,
        }
    }

    /// Parses a dump from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serializes the dump to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the dump to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
