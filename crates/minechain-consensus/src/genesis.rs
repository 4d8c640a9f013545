//! Chain parameters and genesis construction.
//!
//! Every node of one network must run with the same parameters: the genesis
//! timestamp fixes the genesis hash, and the difficulty is not negotiated.

use crate::block::Block;
use crate::error::{ConsensusError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of leading hex zeros required of a block hash.
pub const DEFAULT_DIFFICULTY: usize = 2;

/// Upper bound on difficulty: a SHA-256 hex digest has 64 characters.
pub const MAX_DIFFICULTY: usize = 64;

/// Chain-wide parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParams {
    /// Required leading hex zeros.
    pub difficulty: usize,

    /// Genesis timestamp (unix milliseconds).
    pub genesis_timestamp: u64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_timestamp: 0,
        }
    }
}

impl ChainParams {
    /// Creates parameters with the given difficulty and a zero genesis timestamp.
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    /// Builds the genesis block for these parameters.
    pub fn genesis_block(&self) -> Block {
        Block::genesis(self.genesis_timestamp)
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.difficulty == 0 {
            return Err(ConsensusError::InvalidParams("difficulty must be at least 1".into()));
        }

        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConsensusError::InvalidParams(format!(
                "difficulty {} exceeds maximum {}",
                self.difficulty, MAX_DIFFICULTY
            )));
        }

        Ok(())
    }

    /// Loads parameters from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConsensusError::InvalidParams(format!("failed to read file: {}", e)))?;

        let params: ChainParams = serde_json::from_str(&content)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConsensusError::InvalidParams(format!("failed to read file: {}", e)))?;

        let params: ChainParams = serde_yaml::from_str(&content)
            .map_err(|e| ConsensusError::InvalidParams(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}
