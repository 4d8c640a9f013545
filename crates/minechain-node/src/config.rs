//! Node configuration types.

use crate::error::{NodeError, Result};
use minechain_consensus::ChainParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a Minechain node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Address this node is reachable at; also its own entry in the peer list.
    pub node_address: String,
    /// Peers known at startup.
    pub peers: Vec<String>,
    /// Chain-wide parameters.
    pub chain: ChainParams,
    /// Per-peer deadline for fetching a chain, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Log level.
    pub log_level: String,
    /// Log format (`pretty` or `json`).
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_address: "http://127.0.0.1:8000/".to_string(),
            peers: Vec::new(),
            chain: ChainParams::default(),
            fetch_timeout_ms: 5_000,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.node_address.trim().is_empty() {
            return Err(NodeError::Config("node_address is empty".into()));
        }

        if self.fetch_timeout_ms == 0 {
            return Err(NodeError::Config("fetch_timeout_ms must be positive".into()));
        }

        self.chain.validate()?;
        Ok(())
    }

    /// Returns the per-peer fetch deadline.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain.difficulty, 2);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "node_address: http://127.0.0.1:8001/").unwrap();
        writeln!(file, "peers: [\"http://127.0.0.1:8000/\"]").unwrap();
        writeln!(file, "chain:").unwrap();
        writeln!(file, "  difficulty: 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.node_address, "http://127.0.0.1:8001/");
        assert_eq!(config.peers.len(), 1);
        assert_eq!(config.chain.difficulty, 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_rejects_empty_address() {
        let config = Config {
            node_address: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(NodeError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_difficulty() {
        let mut config = Config::default();
        config.chain.difficulty = 0;
        assert!(matches!(config.validate(), Err(NodeError::Consensus(_))));
    }
}
